//! Terminal rendering: number abbreviation, progress bars, status screen.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sim_core::Timestamp;
use sim_runtime::Portfolio;
use std::fmt::Write;

const BAR_SLOTS: usize = 10;

/// ANSI clear-screen and cursor-home.
pub const CLEAR: &str = "\x1B[2J\x1B[H";

/// Two-decimal money text, rounding half away from zero.
fn two_places(n: f64) -> String {
    match Decimal::from_f64(n) {
        Some(d) => format!(
            "{:.2}",
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => format!("{n:.2}"),
    }
}

/// Abbreviate an amount: `bil`, `mil`, `k`, else plain.
pub fn format_amount(n: f64) -> String {
    if n >= 1e9 {
        format!("{}bil", two_places(n / 1e9))
    } else if n >= 1e6 {
        format!("{}mil", two_places(n / 1e6))
    } else if n >= 1e3 {
        format!("{}k", two_places(n / 1e3))
    } else if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        two_places(n)
    }
}

pub fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction * BAR_SLOTS as f64) as usize).min(BAR_SLOTS);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_SLOTS - filled))
}

/// The full status screen at `now`.
pub fn render(portfolio: &Portfolio, now: Timestamp) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cash: ${:<10}   Total Revenue Per Cycle: ${}\n",
        format_amount(portfolio.cash()),
        format_amount(portfolio.total_yield_rate())
    );
    let _ = writeln!(out, "Businesses (progress):");
    for (idx, unit) in portfolio.units().iter().enumerate() {
        let progress = unit.progress(now);
        let mgr = if unit.has_manager() { " [M]" } else { "" };
        let _ = writeln!(
            out,
            "{}. {:<18}{:<4} Owned:{:<4} Cost:${:<8} R/C:${:<8} {} {:>3}%",
            idx + 1,
            unit.name(),
            mgr,
            unit.owned(),
            format_amount(unit.cost()),
            format_amount(unit.yield_rate()),
            progress_bar(progress),
            (progress * 100.0) as u32
        );
    }
    out
}

pub fn menu() -> &'static str {
    "Actions:\n 1) Buy\n 2) Collect\n 3) Hire Manager\n 4) Save & Exit\n"
}
