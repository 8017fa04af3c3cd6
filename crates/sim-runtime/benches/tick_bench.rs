use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_core::{canonical_roster, ManualClock};

fn managed_portfolio(clock: &ManualClock) -> sim_runtime::Portfolio {
    let roster = canonical_roster();
    let mut p = sim_runtime::new_game(&roster, clock);
    for i in 0..roster.len() {
        p.grant(i, 120).unwrap();
    }
    p.set_cash(1.0e12);
    for i in 0..roster.len() {
        p.hire_manager(i).unwrap();
    }
    p
}

fn bench_ticks(c: &mut Criterion) {
    let clock = ManualClock::new(0.0);
    let mut p = managed_portfolio(&clock);
    c.bench_function("driver_tick", |b| {
        b.iter(|| {
            clock.advance(0.25);
            black_box(sim_runtime::tick(&mut p, &clock))
        })
    });
}

fn bench_catch_up(c: &mut Criterion) {
    let clock = ManualClock::new(0.0);
    let p0 = managed_portfolio(&clock);
    c.bench_function("offline catch-up 30 days", |b| {
        b.iter(|| {
            let mut p = p0.clone();
            black_box(p.catch_up_offline(30.0 * 86_400.0))
        })
    });
}

criterion_group!(benches, bench_ticks, bench_catch_up);
criterion_main!(benches);
