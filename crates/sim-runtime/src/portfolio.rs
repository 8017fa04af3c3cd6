//! The player's full game state: cash plus an ordered roster of units.

use crate::error::PortfolioError;
use crate::unit::ProductionUnit;
use sim_core::{RosterConfig, Timestamp};
use tracing::{debug, info};

/// Cash balance and businesses, in roster order.
///
/// Every mutating operation validates first and applies second, so a
/// rejected action leaves the portfolio untouched.
///
/// Money is held as `f64` on purpose: prices follow `base_cost * 1.07^n` and
/// yields multiply by powers of two, so the balance tracks those real-valued
/// formulas exactly. Rounding to cents happens only for display.
#[derive(Clone, Debug, PartialEq)]
pub struct Portfolio {
    cash: f64,
    units: Vec<ProductionUnit>,
}

impl Portfolio {
    /// A zero-cash portfolio with every roster unit unowned, timers at `now`.
    pub fn new(roster: &RosterConfig, now: Timestamp) -> Self {
        let units = roster
            .units
            .iter()
            .map(|cfg| ProductionUnit::new(cfg.clone(), roster.milestones.clone(), now))
            .collect();
        Self { cash: 0.0, units }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn set_cash(&mut self, cash: f64) {
        self.cash = cash;
    }

    pub fn credit(&mut self, amount: f64) {
        self.cash += amount;
    }

    pub fn units(&self) -> &[ProductionUnit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&ProductionUnit> {
        self.units.get(index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut ProductionUnit> {
        self.units.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), PortfolioError> {
        if index >= self.units.len() {
            return Err(PortfolioError::InvalidIndex {
                index,
                len: self.units.len(),
            });
        }
        Ok(())
    }

    /// Convert a 1-based menu number into an index.
    pub fn resolve_ordinal(&self, ordinal: usize) -> Result<usize, PortfolioError> {
        let index = ordinal.checked_sub(1).ok_or(PortfolioError::InvalidIndex {
            index: 0,
            len: self.units.len(),
        })?;
        self.check_index(index)?;
        Ok(index)
    }

    /// Buy one unit. Succeeds when cash is at least the price.
    pub fn purchase(&mut self, index: usize, now: Timestamp) -> Result<u32, PortfolioError> {
        self.purchase_many(index, 1, now)
    }

    /// Buy `quantity` units at the summed escalating price.
    pub fn purchase_many(
        &mut self,
        index: usize,
        quantity: u32,
        now: Timestamp,
    ) -> Result<u32, PortfolioError> {
        self.check_index(index)?;
        if quantity == 0 {
            return Err(PortfolioError::ZeroQuantity);
        }
        let price = self.units[index].bulk_cost(quantity);
        if self.cash < price {
            return Err(PortfolioError::InsufficientFunds {
                required: price,
                available: self.cash,
            });
        }
        self.cash -= price;
        let unit = &mut self.units[index];
        unit.apply_purchases(quantity);
        debug!(
            index,
            unit = %unit.id(),
            quantity,
            price,
            owned = unit.owned(),
            at = now,
            "purchased"
        );
        Ok(unit.owned())
    }

    /// Add units without charging for them.
    pub fn grant(&mut self, index: usize, quantity: u32) -> Result<u32, PortfolioError> {
        self.check_index(index)?;
        if quantity == 0 {
            return Err(PortfolioError::ZeroQuantity);
        }
        let unit = &mut self.units[index];
        unit.apply_purchases(quantity);
        debug!(index, unit = %unit.id(), quantity, "granted");
        Ok(unit.owned())
    }

    /// Give a brand new game its first business.
    ///
    /// Applies only when cash is zero and the first unit is unowned. Returns
    /// whether the grant happened.
    pub fn grant_starter(&mut self) -> bool {
        let fresh = self.cash == 0.0 && self.units.first().is_some_and(|u| u.owned() == 0);
        fresh && self.grant(0, 1).is_ok()
    }

    /// Hire the one-time manager for a unit.
    pub fn hire_manager(&mut self, index: usize) -> Result<(), PortfolioError> {
        self.check_index(index)?;
        let unit = &self.units[index];
        if unit.has_manager() {
            return Err(PortfolioError::AlreadyManaged { index });
        }
        let price = unit.manager_cost();
        if self.cash < price {
            return Err(PortfolioError::InsufficientFunds {
                required: price,
                available: self.cash,
            });
        }
        self.cash -= price;
        let unit = &mut self.units[index];
        unit.hire_manager();
        debug!(index, unit = %unit.id(), price, "manager hired");
        Ok(())
    }

    /// Collect every ready unmanaged unit. Managed units are skipped.
    pub fn collect_manual(&mut self, now: Timestamp) -> f64 {
        let total: f64 = self
            .units
            .iter_mut()
            .filter(|u| !u.has_manager())
            .map(|u| u.collect(now))
            .sum();
        self.cash += total;
        total
    }

    /// Collect every managed unit that is ready. Called once per driver tick.
    pub fn auto_collect_ready(&mut self, now: Timestamp) -> f64 {
        let total: f64 = self
            .units
            .iter_mut()
            .filter(|u| u.has_manager() && u.is_ready(now))
            .map(|u| u.collect(now))
            .sum();
        self.cash += total;
        total
    }

    /// Credit managed units for every whole interval elapsed up to `now`.
    pub fn catch_up_offline(&mut self, now: Timestamp) -> f64 {
        let mut total = 0.0;
        for unit in &mut self.units {
            let acc = unit.catch_up(now);
            if acc.cycles > 0 {
                info!(
                    unit = %unit.id(),
                    cycles = acc.cycles,
                    earnings = acc.earnings,
                    "offline earnings"
                );
                total += acc.earnings;
            }
        }
        self.cash += total;
        total
    }

    /// Sum of per-cycle yield across all units; display only.
    pub fn total_yield_rate(&self) -> f64 {
        self.units.iter().map(ProductionUnit::yield_rate).sum()
    }
}
