#![deny(warnings)]

//! Stateful simulation engine: businesses and the portfolio that owns them.
//!
//! Every time-sensitive call takes `now` explicitly; nothing here reads a
//! clock. The driver samples its [`sim_core::Clock`] once per tick and passes
//! the value through.

mod error;
mod portfolio;
mod unit;

pub use error::PortfolioError;
pub use portfolio::Portfolio;
pub use unit::{OfflineAccrual, ProductionUnit, UnitState};

use sim_core::{Clock, RosterConfig};

/// Start a new game: fresh roster with the starter business granted.
pub fn new_game(roster: &RosterConfig, clock: &dyn Clock) -> Portfolio {
    let mut portfolio = Portfolio::new(roster, clock.now());
    portfolio.grant_starter();
    portfolio
}

/// Run one driver tick: auto-collect managed units that are ready.
pub fn tick(portfolio: &mut Portfolio, clock: &dyn Clock) -> f64 {
    portfolio.auto_collect_ready(clock.now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{canonical_roster, ManualClock};

    #[test]
    fn new_game_owns_one_lemonade_stand() {
        let clock = ManualClock::new(0.0);
        let p = new_game(&canonical_roster(), &clock);
        assert_eq!(p.units()[0].owned(), 1);
        assert_eq!(p.cash(), 0.0);
        assert_eq!(p.units()[0].cost(), 4.0 * 1.07);
    }

    #[test]
    fn ticks_feed_managed_income() {
        let clock = ManualClock::new(0.0);
        let mut p = new_game(&canonical_roster(), &clock);
        p.set_cash(400.0);
        p.hire_manager(0).unwrap();
        let mut earned = 0.0;
        for _ in 0..10 {
            clock.advance(1.0);
            earned += tick(&mut p, &clock);
        }
        assert_eq!(earned, 10.0);
        assert_eq!(p.cash(), 10.0);
    }
}
