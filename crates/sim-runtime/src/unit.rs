//! A single business: pricing, readiness timer and milestone multiplier.

use sim_core::{MilestoneSchedule, Timestamp, UnitConfig, UnitId};
use sim_econ::{
    bulk_price, cycle_yield, elapsed_cycles, manager_price, milestone_factor, milestone_step,
    progress_fraction, unit_price,
};
use tracing::{debug, warn};

/// The mutable fields of a unit; exactly what a save file carries.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitState {
    pub owned: u32,
    pub has_manager: bool,
    pub multiplier: f64,
    pub last_collection: Timestamp,
}

/// Result of reconciling a managed unit against time spent offline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OfflineAccrual {
    /// Whole intervals credited.
    pub cycles: u64,
    /// Cash earned over those intervals.
    pub earnings: f64,
}

/// One ownable revenue source.
///
/// Configuration is fixed at construction. Owned count only grows, the
/// manager flag only flips on, and the multiplier only doubles.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductionUnit {
    config: UnitConfig,
    milestones: MilestoneSchedule,
    owned: u32,
    has_manager: bool,
    multiplier: f64,
    last_collection: Timestamp,
}

impl ProductionUnit {
    /// A fresh, unowned unit whose timer starts at `now`.
    pub fn new(config: UnitConfig, milestones: MilestoneSchedule, now: Timestamp) -> Self {
        Self {
            config,
            milestones,
            owned: 0,
            has_manager: false,
            multiplier: 1.0,
            last_collection: now,
        }
    }

    pub fn id(&self) -> &UnitId {
        &self.config.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    pub fn owned(&self) -> u32 {
        self.owned
    }

    pub fn has_manager(&self) -> bool {
        self.has_manager
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn last_collection(&self) -> Timestamp {
        self.last_collection
    }

    /// Price of the next unit.
    pub fn cost(&self) -> f64 {
        unit_price(self.config.base_cost, self.owned)
    }

    /// Price of the next `quantity` units bought in sequence.
    pub fn bulk_cost(&self, quantity: u32) -> f64 {
        bulk_price(self.config.base_cost, self.owned, quantity)
    }

    pub fn manager_cost(&self) -> f64 {
        manager_price(self.config.base_cost)
    }

    /// Full-cycle yield at the current count; not gated by readiness.
    pub fn yield_rate(&self) -> f64 {
        cycle_yield(self.config.base_yield, self.owned, self.multiplier)
    }

    pub fn is_ready(&self, now: Timestamp) -> bool {
        now - self.last_collection >= self.config.interval_secs
    }

    /// Collect one cycle's earnings if the unit is owned and ready.
    ///
    /// A no-op collection returns 0 and leaves the timer alone. Time elapsed
    /// beyond a single interval is forfeited.
    pub fn collect(&mut self, now: Timestamp) -> f64 {
        if self.owned == 0 || !self.is_ready(now) {
            return 0.0;
        }
        let earnings = self.yield_rate();
        self.last_collection = now;
        earnings
    }

    /// Fraction of the current cycle elapsed, in [0, 1].
    pub fn progress(&self, now: Timestamp) -> f64 {
        progress_fraction(now - self.last_collection, self.config.interval_secs)
    }

    /// Add one unit and apply any milestone it lands on.
    pub fn apply_purchase(&mut self) -> u32 {
        self.apply_purchases(1)
    }

    /// Add `quantity` units and double the multiplier once per newly spanned
    /// threshold. Returns the number of milestones crossed.
    pub fn apply_purchases(&mut self, quantity: u32) -> u32 {
        let before = self.owned;
        self.owned = self.owned.saturating_add(quantity);
        let crossed = self.milestones.spanned(before, self.owned);
        if crossed > 0 {
            self.multiplier *= milestone_step(&self.milestones, before, self.owned);
            debug!(
                unit = %self.config.id,
                owned = self.owned,
                multiplier = self.multiplier,
                "milestone reached"
            );
        }
        crossed
    }

    /// Mark the unit as managed. Returns false if it already was.
    pub fn hire_manager(&mut self) -> bool {
        if self.has_manager {
            return false;
        }
        self.has_manager = true;
        true
    }

    /// Credit every whole interval elapsed since the last collection.
    ///
    /// Only managed, owned units accrue. The timer advances by exactly the
    /// credited intervals, keeping the sub-interval remainder.
    pub fn catch_up(&mut self, now: Timestamp) -> OfflineAccrual {
        if !self.has_manager || self.owned == 0 {
            return OfflineAccrual::default();
        }
        let interval = self.config.interval_secs;
        let cycles = match elapsed_cycles(now - self.last_collection, interval) {
            Ok(c) => c,
            Err(e) => {
                warn!(unit = %self.config.id, error = %e, "skipping catch-up");
                return OfflineAccrual::default();
            }
        };
        if cycles == 0 {
            return OfflineAccrual::default();
        }
        let earnings = cycles as f64 * self.yield_rate();
        self.last_collection = (self.last_collection + cycles as f64 * interval).min(now);
        OfflineAccrual { cycles, earnings }
    }

    /// Snapshot of the persisted fields.
    pub fn state(&self) -> UnitState {
        UnitState {
            owned: self.owned,
            has_manager: self.has_manager,
            multiplier: self.multiplier,
            last_collection: self.last_collection,
        }
    }

    /// Overwrite the persisted fields from a save.
    ///
    /// A timestamp in the future is clamped to `now`. A multiplier that is not
    /// a positive finite number is recomputed from the owned count.
    pub fn restore_state(&mut self, state: &UnitState, now: Timestamp) {
        self.owned = state.owned;
        self.has_manager = state.has_manager;
        self.multiplier = if state.multiplier.is_finite() && state.multiplier > 0.0 {
            state.multiplier
        } else {
            warn!(unit = %self.config.id, multiplier = state.multiplier, "bad saved multiplier");
            milestone_factor(self.milestones.reached(state.owned))
        };
        self.last_collection = if state.last_collection.is_finite() {
            state.last_collection.min(now)
        } else {
            now
        };
    }
}
