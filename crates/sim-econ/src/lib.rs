#![deny(warnings)]

//! Economic models: pricing, yield and cycle accounting for Idle Tycoon.
//!
//! This module provides the pure formulas behind a business:
//! - Escalating unit price (7% per owned unit) and bulk price
//! - Flat manager price
//! - Per-cycle yield with the milestone multiplier
//! - Whole-cycle counting over an elapsed span, used by offline catch-up
//!
//! Every formula is recomputed from the owned count; nothing here caches a
//! "current price".

use sim_core::MilestoneSchedule;
use thiserror::Error;

/// Price growth per owned unit.
pub const PRICE_GROWTH: f64 = 1.07;

/// Manager price as a multiple of the base cost.
pub const MANAGER_COST_FACTOR: f64 = 100.0;

/// Yield factor applied per milestone reached.
pub const MILESTONE_FACTOR: f64 = 2.0;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Interval must be finite and strictly positive.
    #[error("invalid interval: {0}")]
    InvalidInterval(f64),
    /// Elapsed time must be finite.
    #[error("non-finite elapsed time")]
    NonFinite,
}

/// Price of the next unit when `owned` are already held.
///
/// Example:
/// assert_eq!(unit_price(4.0, 0), 4.0);
pub fn unit_price(base_cost: f64, owned: u32) -> f64 {
    base_cost * PRICE_GROWTH.powf(f64::from(owned))
}

/// Total price of buying `quantity` units one after another starting from `owned`.
///
/// Summed unit by unit so `bulk_price(c, n, 1) == unit_price(c, n)` exactly.
pub fn bulk_price(base_cost: f64, owned: u32, quantity: u32) -> f64 {
    (0..quantity)
        .map(|i| unit_price(base_cost, owned.saturating_add(i)))
        .sum()
}

/// Flat manager price, independent of how many units are owned.
pub fn manager_price(base_cost: f64) -> f64 {
    base_cost * MANAGER_COST_FACTOR
}

/// Earnings of one full cycle.
pub fn cycle_yield(base_yield: f64, owned: u32, multiplier: f64) -> f64 {
    base_yield * f64::from(owned) * multiplier
}

/// Multiplier earned by reaching `milestones` thresholds.
pub fn milestone_factor(milestones: u32) -> f64 {
    MILESTONE_FACTOR.powf(f64::from(milestones))
}

/// Multiplier for a business that has just moved from `from` to `to` units.
///
/// Counts every threshold in `(from, to]`, so buying several units at once can
/// never skip a doubling and re-checking the same count never doubles twice.
pub fn milestone_step(schedule: &MilestoneSchedule, from: u32, to: u32) -> f64 {
    milestone_factor(schedule.spanned(from, to))
}

/// Number of whole intervals contained in `elapsed`.
///
/// Negative or sub-interval spans yield zero.
pub fn elapsed_cycles(elapsed: f64, interval: f64) -> Result<u64, EconError> {
    if !(interval.is_finite() && interval > 0.0) {
        return Err(EconError::InvalidInterval(interval));
    }
    if !elapsed.is_finite() {
        return Err(EconError::NonFinite);
    }
    if elapsed < interval {
        return Ok(0);
    }
    let mut k = (elapsed / interval).floor();
    // The timer advance multiplies, so settle on the multiplicative answer
    // when the division rounds across an exact multiple.
    if k * interval > elapsed {
        k -= 1.0;
    } else if (k + 1.0) * interval <= elapsed {
        k += 1.0;
    }
    Ok(k as u64)
}

/// Fraction of the current interval completed, clamped to [0, 1].
pub fn progress_fraction(elapsed: f64, interval: f64) -> f64 {
    if !(interval.is_finite() && interval > 0.0) || !elapsed.is_finite() {
        return 0.0;
    }
    (elapsed / interval).clamp(0.0, 1.0)
}
