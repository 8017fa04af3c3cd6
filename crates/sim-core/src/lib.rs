#![deny(warnings)]

//! Core configuration models and invariants for Idle Tycoon.
//!
//! This crate defines the immutable side of the simulation: which businesses
//! exist, what they cost and yield, the milestone schedule, and the clock
//! abstraction every time-sensitive operation is driven by. Mutable game state
//! lives in `sim-runtime`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Wall-clock instant in fractional seconds since the Unix epoch.
pub type Timestamp = f64;

/// Stable identifier for a business, e.g. "lemonade_stand".
///
/// Saves are keyed by this value, so it must not change between releases even
/// if the display name does.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Economic parameters of one business. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Stable identifier used by the save format.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Price of the first unit (> 0).
    pub base_cost: f64,
    /// Earnings per owned unit per cycle (> 0).
    pub base_yield: f64,
    /// Seconds per production cycle (> 0).
    pub interval_secs: f64,
}

impl UnitConfig {
    pub fn new(
        id: &str,
        name: &str,
        base_cost: f64,
        base_yield: f64,
        interval_secs: f64,
    ) -> Self {
        Self {
            id: UnitId::new(id),
            name: name.to_string(),
            base_cost,
            base_yield,
            interval_secs,
        }
    }
}

/// Ascending owned-count thresholds that each double a unit's yield once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct MilestoneSchedule {
    thresholds: Vec<u32>,
}

impl MilestoneSchedule {
    /// Build a schedule; thresholds must be non-zero and strictly ascending.
    pub fn new(thresholds: Vec<u32>) -> Result<Self, ValidationError> {
        if thresholds.first() == Some(&0) {
            return Err(ValidationError::ZeroThreshold);
        }
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ValidationError::UnsortedThresholds);
        }
        Ok(Self { thresholds })
    }

    /// A schedule with no milestones at all.
    pub fn empty() -> Self {
        Self { thresholds: vec![] }
    }

    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    /// Number of thresholds `t` with `from < t <= to`.
    ///
    /// This is the count of doublings earned by moving the owned count from
    /// `from` to `to`; it is zero whenever `to <= from`.
    pub fn spanned(&self, from: u32, to: u32) -> u32 {
        if to <= from {
            return 0;
        }
        let lo = self.thresholds.partition_point(|&t| t <= from);
        let hi = self.thresholds.partition_point(|&t| t <= to);
        (hi - lo) as u32
    }

    /// Number of thresholds at or below `count`.
    pub fn reached(&self, count: u32) -> u32 {
        self.thresholds.partition_point(|&t| t <= count) as u32
    }
}

impl Default for MilestoneSchedule {
    fn default() -> Self {
        Self {
            thresholds: CANONICAL_MILESTONES.to_vec(),
        }
    }
}

impl TryFrom<Vec<u32>> for MilestoneSchedule {
    type Error = ValidationError;

    fn try_from(value: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MilestoneSchedule> for Vec<u32> {
    fn from(value: MilestoneSchedule) -> Self {
        value.thresholds
    }
}

/// Milestones used by the shipped roster.
pub const CANONICAL_MILESTONES: [u32; 6] = [25, 50, 100, 250, 500, 1000];

/// The ordered set of businesses a game is played with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Businesses in display order; the 1-based menu number follows this order.
    pub units: Vec<UnitConfig>,
    /// Milestones applied to every unit.
    #[serde(default)]
    pub milestones: MilestoneSchedule,
}

impl RosterConfig {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Position of the unit with the given id.
    pub fn position(&self, id: &UnitId) -> Option<usize> {
        self.units.iter().position(|u| &u.id == id)
    }
}

/// The five businesses the game ships with.
pub fn canonical_roster() -> RosterConfig {
    RosterConfig {
        units: vec![
            UnitConfig::new("lemonade_stand", "Lemonade Stand", 4.0, 1.0, 1.0),
            UnitConfig::new("newspaper_delivery", "Newspaper Delivery", 60.0, 60.0, 10.0),
            UnitConfig::new("car_wash", "Car Wash", 720.0, 540.0, 100.0),
            UnitConfig::new("pizza_delivery", "Pizza Delivery", 8640.0, 4320.0, 1000.0),
            UnitConfig::new("donut_shop", "Donut Shop", 103_680.0, 51_840.0, 10_000.0),
        ],
        milestones: MilestoneSchedule::default(),
    }
}

/// Validation errors for roster configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Roster must contain at least one business.
    #[error("roster has no businesses")]
    EmptyRoster,
    /// Id must be non-empty and contain no whitespace.
    #[error("invalid unit id: {0:?}")]
    InvalidId(String),
    /// Display name must not be blank.
    #[error("unit {0} has a blank name")]
    BlankName(String),
    /// Two units share an id.
    #[error("duplicate unit id: {0}")]
    DuplicateId(String),
    /// Cost, yield and interval must be finite and > 0.
    #[error("unit {unit}: {field} must be finite and > 0")]
    NonPositive { unit: String, field: &'static str },
    /// A threshold of zero would double the multiplier of an empty business.
    #[error("milestone thresholds must be > 0")]
    ZeroThreshold,
    /// Thresholds must be strictly ascending.
    #[error("milestone thresholds must be strictly ascending")]
    UnsortedThresholds,
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Validate a single business definition.
pub fn validate_unit_config(u: &UnitConfig) -> Result<(), ValidationError> {
    if u.id.0.is_empty() || u.id.0.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidId(u.id.0.clone()));
    }
    if u.name.trim().is_empty() {
        return Err(ValidationError::BlankName(u.id.0.clone()));
    }
    for (field, value) in [
        ("base_cost", u.base_cost),
        ("base_yield", u.base_yield),
        ("interval_secs", u.interval_secs),
    ] {
        if !positive(value) {
            return Err(ValidationError::NonPositive {
                unit: u.id.0.clone(),
                field,
            });
        }
    }
    Ok(())
}

/// Validate the roster, including id uniqueness.
pub fn validate_roster(roster: &RosterConfig) -> Result<(), ValidationError> {
    if roster.units.is_empty() {
        return Err(ValidationError::EmptyRoster);
    }
    let mut ids: BTreeSet<&UnitId> = BTreeSet::new();
    for u in &roster.units {
        validate_unit_config(u)?;
        if !ids.insert(&u.id) {
            return Err(ValidationError::DuplicateId(u.id.0.clone()));
        }
    }
    Ok(())
}

/// Errors raised while loading a roster override file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster yaml: {0}")]
    Yaml(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Parse and validate a roster from YAML text.
pub fn parse_roster(text: &str) -> Result<RosterConfig, ConfigError> {
    let roster: RosterConfig =
        serde_yaml::from_str(text).map_err(|e| ConfigError::Yaml(e.to_string()))?;
    validate_roster(&roster)?;
    Ok(roster)
}

/// Read, parse and validate a roster file.
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<RosterConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    parse_roster(&text)
}

/// Source of the current time.
///
/// Callers read it once per logical operation and pass the value down, so a
/// single purchase or catch-up never observes two different instants.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Manually driven clock for tests, benches and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, t: Timestamp) {
        self.now.set(t);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_roster_is_valid() {
        let r = canonical_roster();
        validate_roster(&r).unwrap();
        assert_eq!(r.len(), 5);
        assert_eq!(r.units[0].name, "Lemonade Stand");
        assert_eq!(r.units[0].base_cost, 4.0);
        assert_eq!(r.milestones.thresholds(), &CANONICAL_MILESTONES);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut r = canonical_roster();
        r.units[1].id = r.units[0].id.clone();
        assert_eq!(
            validate_roster(&r),
            Err(ValidationError::DuplicateId("lemonade_stand".into()))
        );
    }

    #[test]
    fn non_positive_interval_rejected() {
        let u = UnitConfig::new("x", "X", 1.0, 1.0, 0.0);
        assert!(matches!(
            validate_unit_config(&u),
            Err(ValidationError::NonPositive { field: "interval_secs", .. })
        ));
        let u = UnitConfig::new("x", "X", f64::NAN, 1.0, 1.0);
        assert!(validate_unit_config(&u).is_err());
    }

    #[test]
    fn schedule_rejects_bad_thresholds() {
        assert_eq!(
            MilestoneSchedule::new(vec![0, 5]),
            Err(ValidationError::ZeroThreshold)
        );
        assert_eq!(
            MilestoneSchedule::new(vec![5, 5]),
            Err(ValidationError::UnsortedThresholds)
        );
        assert_eq!(
            MilestoneSchedule::new(vec![10, 5]),
            Err(ValidationError::UnsortedThresholds)
        );
    }

    #[test]
    fn spanned_counts_half_open_range() {
        let s = MilestoneSchedule::default();
        assert_eq!(s.spanned(24, 25), 1);
        assert_eq!(s.spanned(25, 25), 0);
        assert_eq!(s.spanned(25, 26), 0);
        assert_eq!(s.spanned(0, 100), 3);
        assert_eq!(s.spanned(30, 20), 0);
        assert_eq!(s.reached(49), 1);
        assert_eq!(s.reached(1000), 6);
    }

    #[test]
    fn yaml_roster_parses_with_default_milestones() {
        let text = r#"
units:
  - id: kiosk
    name: Kiosk
    base_cost: 2
    base_yield: 1
    interval_secs: 0.5
"#;
        let r = parse_roster(text).unwrap();
        assert_eq!(r.units[0].id, UnitId::new("kiosk"));
        assert_eq!(r.milestones, MilestoneSchedule::default());
    }

    #[test]
    fn yaml_roster_rejects_unsorted_milestones() {
        let text = r#"
milestones: [10, 3]
units:
  - { id: kiosk, name: Kiosk, base_cost: 2, base_yield: 1, interval_secs: 1 }
"#;
        assert!(matches!(parse_roster(text), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn shipped_roster_asset_matches_canonical() {
        let path =
            std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/roster.yaml");
        let r = load_roster(path).unwrap();
        assert_eq!(r, canonical_roster());
    }

    #[test]
    fn manual_clock_advances() {
        let c = ManualClock::new(100.0);
        c.advance(2.5);
        assert_eq!(c.now(), 102.5);
        c.set(7.0);
        assert_eq!(c.now(), 7.0);
    }

    proptest! {
        #[test]
        fn spanned_is_additive(a in 0u32..2000, b in 0u32..2000, c in 0u32..2000) {
            let s = MilestoneSchedule::default();
            let mut v = [a, b, c];
            v.sort_unstable();
            prop_assert_eq!(s.spanned(v[0], v[2]), s.spanned(v[0], v[1]) + s.spanned(v[1], v[2]));
            prop_assert_eq!(s.spanned(0, v[2]), s.reached(v[2]));
        }
    }
}
