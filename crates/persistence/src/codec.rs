//! Projection of a portfolio into a save record and back, with offline catch-up.

use crate::record::{SaveRecord, SavedUnit, SAVE_VERSION};
use sim_core::{RosterConfig, Timestamp, UnitId};
use sim_runtime::{Portfolio, UnitState};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Disagreement between a save file and the roster it is loaded into.
#[derive(Clone, Debug, PartialEq)]
pub enum RosterMismatch {
    /// Saved entry names a business the roster does not have; skipped.
    UnknownUnit(UnitId),
    /// Roster business with no saved entry; keeps fresh defaults.
    MissingUnit(UnitId),
    /// Second saved entry for the same id; skipped.
    DuplicateEntry(UnitId),
    /// Entry without an id in a keyed save; skipped.
    UnnamedEntry { position: usize },
    /// Positional entry past the end of the roster; skipped.
    ExtraEntry { position: usize },
}

/// Where a loaded portfolio came from.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadSource {
    /// Restored from a save record.
    Saved,
    /// No save existed; fresh defaults.
    Missing,
    /// Save existed but could not be read or parsed; fresh defaults.
    Corrupt(String),
}

/// Result of restoring a portfolio.
#[derive(Clone, Debug)]
pub struct Restored {
    pub portfolio: Portfolio,
    /// Cash credited by offline catch-up; already included in the balance.
    pub offline_earnings: f64,
    pub mismatches: Vec<RosterMismatch>,
    pub source: LoadSource,
}

impl Restored {
    /// Fresh default portfolio, used when nothing could be restored.
    pub fn fresh(roster: &RosterConfig, now: Timestamp, source: LoadSource) -> Self {
        Self {
            portfolio: Portfolio::new(roster, now),
            offline_earnings: 0.0,
            mismatches: vec![],
            source,
        }
    }
}

/// Pure projection of the portfolio's mutable state at `now`.
pub fn serialize(portfolio: &Portfolio, now: Timestamp) -> SaveRecord {
    let businesses = portfolio
        .units()
        .iter()
        .map(|u| {
            let s = u.state();
            SavedUnit {
                id: Some(u.id().clone()),
                count: s.owned,
                manager: s.has_manager,
                multiplier: s.multiplier,
                last_time: s.last_collection,
            }
        })
        .collect();
    SaveRecord {
        version: SAVE_VERSION,
        cash: portfolio.cash(),
        timestamp: now,
        businesses,
    }
}

fn unit_state(saved: &SavedUnit) -> UnitState {
    UnitState {
        owned: saved.count,
        has_manager: saved.manager,
        multiplier: saved.multiplier,
        last_collection: saved.last_time,
    }
}

/// Pair saved entries with roster positions.
fn assign(
    record: &SaveRecord,
    roster: &RosterConfig,
) -> (Vec<(usize, usize)>, Vec<RosterMismatch>) {
    let mut pairs = Vec::new();
    let mut mismatches = Vec::new();
    if record.is_keyed() {
        let mut seen: BTreeSet<&UnitId> = BTreeSet::new();
        for (position, entry) in record.businesses.iter().enumerate() {
            let Some(id) = entry.id.as_ref() else {
                mismatches.push(RosterMismatch::UnnamedEntry { position });
                continue;
            };
            if !seen.insert(id) {
                mismatches.push(RosterMismatch::DuplicateEntry(id.clone()));
                continue;
            }
            match roster.position(id) {
                Some(index) => pairs.push((position, index)),
                None => mismatches.push(RosterMismatch::UnknownUnit(id.clone())),
            }
        }
        for unit in &roster.units {
            if !seen.contains(&unit.id) {
                mismatches.push(RosterMismatch::MissingUnit(unit.id.clone()));
            }
        }
    } else {
        for position in 0..record.businesses.len() {
            if position < roster.len() {
                pairs.push((position, position));
            } else {
                mismatches.push(RosterMismatch::ExtraEntry { position });
            }
        }
        for unit in roster.units.iter().skip(record.businesses.len()) {
            mismatches.push(RosterMismatch::MissingUnit(unit.id.clone()));
        }
    }
    (pairs, mismatches)
}

/// Rebuild a portfolio from a record and credit offline earnings up to `now`.
///
/// Configuration comes from `roster`; only mutable fields are copied. Managed
/// units receive every whole interval elapsed since their last collection,
/// and their timers advance by exactly those intervals.
pub fn restore(record: &SaveRecord, roster: &RosterConfig, now: Timestamp) -> Restored {
    let mut portfolio = Portfolio::new(roster, now);
    let (pairs, mismatches) = assign(record, roster);
    for m in &mismatches {
        warn!(?m, "save does not match roster");
    }
    for (position, index) in pairs {
        if let Some(unit) = portfolio.unit_mut(index) {
            unit.restore_state(&unit_state(&record.businesses[position]), now);
        }
    }
    let cash = if record.cash.is_finite() {
        record.cash
    } else {
        warn!(cash = record.cash, "bad saved cash, resetting");
        0.0
    };
    portfolio.set_cash(cash);
    let offline_earnings = portfolio.catch_up_offline(now);
    if offline_earnings > 0.0 {
        info!(offline_earnings, away_secs = now - record.timestamp, "applied offline catch-up");
    }
    Restored {
        portfolio,
        offline_earnings,
        mismatches,
        source: LoadSource::Saved,
    }
}
