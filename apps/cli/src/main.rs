#![deny(warnings)]

//! Interactive terminal driver for Idle Tycoon.

mod ui;

use anyhow::{Context, Result};
use chrono::DateTime;
use persistence::{load_game, save_game, LoadSource, Restored};
use sim_core::{canonical_roster, load_roster, Clock, RosterConfig, SystemClock, Timestamp};
use sim_runtime::{new_game, tick, Portfolio, PortfolioError};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    save: PathBuf,
    roster: Option<PathBuf>,
    fresh: bool,
    pause: Duration,
}

fn parse_args() -> Args {
    let mut args = Args {
        save: PathBuf::from(persistence::default_save_path()),
        roster: None,
        fresh: false,
        pause: Duration::from_millis(1000),
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--save" => {
                if let Some(p) = it.next() {
                    args.save = PathBuf::from(p);
                }
            }
            "--roster" => args.roster = it.next().map(PathBuf::from),
            "--fresh" => args.fresh = true,
            "--pause-ms" => {
                if let Some(ms) = it.next().and_then(|s| s.parse().ok()) {
                    args.pause = Duration::from_millis(ms);
                }
            }
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

/// One menu choice.
#[derive(Debug, PartialEq)]
enum Action {
    Buy,
    Collect,
    Hire,
    SaveExit,
    Invalid,
}

impl Action {
    fn parse(choice: &str) -> Self {
        match choice.trim() {
            "1" => Action::Buy,
            "2" => Action::Collect,
            "3" => Action::Hire,
            "4" => Action::SaveExit,
            _ => Action::Invalid,
        }
    }
}

fn describe(err: &PortfolioError) -> &'static str {
    match err {
        PortfolioError::InvalidIndex { .. } | PortfolioError::ZeroQuantity => "Invalid selection.",
        PortfolioError::InsufficientFunds { .. } => "Insufficient funds.",
        PortfolioError::AlreadyManaged { .. } => "Manager already hired.",
    }
}

fn parse_ordinal(portfolio: &Portfolio, input: &str) -> Result<usize, PortfolioError> {
    let ordinal = input.trim().parse::<usize>().unwrap_or(0);
    portfolio.resolve_ordinal(ordinal)
}

/// Buy one unit of the business named by a 1-based number.
fn buy(portfolio: &mut Portfolio, input: &str, now: Timestamp) -> String {
    let result = parse_ordinal(portfolio, input).and_then(|idx| {
        let count = portfolio.purchase(idx, now)?;
        Ok((idx, count))
    });
    match result {
        Ok((idx, count)) => {
            let name = portfolio.units()[idx].name();
            format!("Purchased 1 {name}! Total: {count}")
        }
        Err(e) => describe(&e).to_string(),
    }
}

fn hire(portfolio: &mut Portfolio, input: &str) -> String {
    let result = parse_ordinal(portfolio, input).and_then(|idx| {
        portfolio.hire_manager(idx)?;
        Ok(idx)
    });
    match result {
        Ok(idx) => format!("Manager hired for {}.", portfolio.units()[idx].name()),
        Err(PortfolioError::InsufficientFunds { .. }) => {
            "Insufficient funds for manager.".to_string()
        }
        Err(e) => describe(&e).to_string(),
    }
}

fn collect(portfolio: &mut Portfolio, now: Timestamp) -> String {
    let collected = portfolio.collect_manual(now);
    if collected > 0.0 {
        format!("Collected ${} manually.", ui::format_amount(collected))
    } else {
        "Nothing to collect.".to_string()
    }
}

/// Run a menu action, sampling the clock when the action happens.
///
/// `ordinal` reads the business number for actions that need one. Save & Exit
/// is handled by the loop itself.
fn perform(
    action: Action,
    portfolio: &mut Portfolio,
    clock: &dyn Clock,
    mut ordinal: impl FnMut() -> String,
) -> String {
    match action {
        Action::Buy => {
            let input = ordinal();
            buy(portfolio, &input, clock.now())
        }
        Action::Collect => collect(portfolio, clock.now()),
        Action::Hire => {
            let input = ordinal();
            hire(portfolio, &input)
        }
        Action::SaveExit | Action::Invalid => "Invalid action.".to_string(),
    }
}

fn load_roster_or_default(path: Option<&PathBuf>) -> Result<RosterConfig> {
    match path {
        Some(p) => load_roster(p).with_context(|| format!("loading roster {}", p.display())),
        None => Ok(canonical_roster()),
    }
}

fn welcome(restored: &Restored) {
    match &restored.source {
        LoadSource::Saved => {
            println!("Welcome back!");
            if restored.offline_earnings > 0.0 {
                println!(
                    "Your managers earned ${} while you were away.",
                    ui::format_amount(restored.offline_earnings)
                );
            }
        }
        LoadSource::Missing => println!("Starting a new game."),
        LoadSource::Corrupt(reason) => {
            println!("Save file could not be read ({reason}); starting a new game.")
        }
    }
    if !restored.mismatches.is_empty() {
        println!(
            "Note: {} save entries did not match the current businesses.",
            restored.mismatches.len()
        );
    }
}

fn save(args: &Args, portfolio: &Portfolio, now: Timestamp) -> Result<()> {
    let record = save_game(&args.save, portfolio, now)
        .with_context(|| format!("saving to {}", args.save.display()))?;
    let when = DateTime::from_timestamp(record.timestamp as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default();
    info!(path = %args.save.display(), %when, "game saved");
    Ok(())
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> Option<String> {
    print!("{text}");
    let _ = io::stdout().flush();
    lines.next().and_then(|l| l.ok())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = parse_args();
    let roster = load_roster_or_default(args.roster.as_ref())?;
    let clock = SystemClock;
    info!(save = %args.save.display(), fresh = args.fresh, units = roster.len(), "starting");

    let mut portfolio = if args.fresh {
        println!("Starting a new game.");
        new_game(&roster, &clock)
    } else {
        let restored = load_game(&args.save, &roster, clock.now());
        welcome(&restored);
        let mut portfolio = restored.portfolio;
        portfolio.grant_starter();
        portfolio
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        tick(&mut portfolio, &clock);
        let shown_at = clock.now();
        print!(
            "{}{}\n{}",
            ui::CLEAR,
            ui::render(&portfolio, shown_at),
            ui::menu()
        );

        let Some(choice) = prompt(&mut lines, "Select: ") else {
            save(&args, &portfolio, clock.now())?;
            println!("\nGame saved. Goodbye!");
            return Ok(());
        };
        let message = match Action::parse(&choice) {
            Action::SaveExit => match save(&args, &portfolio, clock.now()) {
                Ok(()) => {
                    println!("Game saved. Goodbye!");
                    return Ok(());
                }
                Err(e) => format!("Save failed: {e:#}"),
            },
            action => perform(action, &mut portfolio, &clock, || {
                prompt(&mut lines, "Business #: ").unwrap_or_default()
            }),
        };
        println!("{message}");
        std::thread::sleep(args.pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::ManualClock;

    fn game() -> Portfolio {
        let mut p = Portfolio::new(&canonical_roster(), 0.0);
        p.grant_starter();
        p
    }

    #[test]
    fn actions_parse() {
        assert_eq!(Action::parse(" 1\n"), Action::Buy);
        assert_eq!(Action::parse("4"), Action::SaveExit);
        assert_eq!(Action::parse("x"), Action::Invalid);
    }

    #[test]
    fn buy_reports_outcomes() {
        let mut p = game();
        assert_eq!(buy(&mut p, "1", 0.0), "Insufficient funds.");
        assert_eq!(buy(&mut p, "0", 0.0), "Invalid selection.");
        assert_eq!(buy(&mut p, "abc", 0.0), "Invalid selection.");
        p.set_cash(5.0);
        assert_eq!(buy(&mut p, "1", 0.0), "Purchased 1 Lemonade Stand! Total: 2");
    }

    #[test]
    fn hire_reports_outcomes() {
        let mut p = game();
        assert_eq!(hire(&mut p, "1"), "Insufficient funds for manager.");
        p.set_cash(400.0);
        assert_eq!(hire(&mut p, "1"), "Manager hired for Lemonade Stand.");
        assert_eq!(hire(&mut p, "1"), "Manager already hired.");
        assert_eq!(hire(&mut p, "9"), "Invalid selection.");
    }

    #[test]
    fn collect_reports_outcomes() {
        let mut p = game();
        assert_eq!(collect(&mut p, 0.5), "Nothing to collect.");
        assert_eq!(collect(&mut p, 1.0), "Collected $1 manually.");
        assert_eq!(p.cash(), 1.0);
    }

    #[test]
    fn collect_uses_time_of_choice_not_of_render() {
        let clock = ManualClock::new(0.0);
        let mut p = new_game(&canonical_roster(), &clock);
        clock.advance(0.9);
        let screen = ui::render(&p, clock.now());
        assert!(screen.contains(" 90%"));
        clock.advance(5.0);
        let message = perform(Action::Collect, &mut p, &clock, String::new);
        assert_eq!(message, "Collected $1 manually.");
        assert_eq!(p.units()[0].last_collection(), clock.now());
    }

    #[test]
    fn buy_prices_after_the_number_is_entered() {
        let clock = ManualClock::new(0.0);
        let mut p = new_game(&canonical_roster(), &clock);
        p.set_cash(10.0);
        let message = perform(Action::Buy, &mut p, &clock, || {
            clock.advance(3.0);
            "1".to_string()
        });
        assert_eq!(message, "Purchased 1 Lemonade Stand! Total: 2");
        assert_eq!(perform(Action::Invalid, &mut p, &clock, String::new), "Invalid action.");
    }
}
