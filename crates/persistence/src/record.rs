//! Durable save format.
//!
//! ```json
//! {
//!   "version": 2,
//!   "cash": 12.5,
//!   "timestamp": 1700000000.25,
//!   "businesses": [
//!     { "id": "lemonade_stand", "count": 3, "manager": false,
//!       "multiplier": 1.0, "last_time": 1699999990.0 }
//!   ]
//! }
//! ```
//!
//! Version 1 files have no `version` and no per-entry `id`; their entries
//! are matched to the roster by position.

use crate::error::PersistenceError;
use serde::{Deserialize, Serialize};
use sim_core::UnitId;

/// Format version written by this build.
pub const SAVE_VERSION: u32 = 2;

fn legacy_version() -> u32 {
    1
}

/// Snapshot of a portfolio's mutable state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub cash: f64,
    /// Seconds since the epoch at save time; informational only.
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub businesses: Vec<SavedUnit>,
}

/// Persisted fields of one business.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UnitId>,
    pub count: u32,
    pub manager: bool,
    pub multiplier: f64,
    pub last_time: f64,
}

impl SaveRecord {
    /// True when entries carry ids and are matched by key.
    pub fn is_keyed(&self) -> bool {
        self.businesses.iter().any(|b| b.id.is_some())
    }
}

/// Render a record as pretty JSON.
pub fn encode(record: &SaveRecord) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Parse a record from JSON text.
pub fn decode(text: &str) -> Result<SaveRecord, PersistenceError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_file_parses_as_version_one() {
        let text = r#"{"cash": 12.5, "timestamp": 1700000000.0, "businesses": [
            {"count": 3, "manager": false, "multiplier": 1.0, "last_time": 1699999990.5},
            {"count": 0, "manager": false, "multiplier": 1.0, "last_time": 1699999990.5}
        ]}"#;
        let r = decode(text).unwrap();
        assert_eq!(r.version, 1);
        assert_eq!(r.cash, 12.5);
        assert_eq!(r.businesses.len(), 2);
        assert_eq!(r.businesses[0].count, 3);
        assert!(!r.is_keyed());
    }

    #[test]
    fn missing_top_level_fields_default() {
        let r = decode("{}").unwrap();
        assert_eq!(r.cash, 0.0);
        assert!(r.businesses.is_empty());
    }

    #[test]
    fn malformed_entry_is_an_error() {
        assert!(decode(r#"{"businesses": [{"count": -1}]}"#).is_err());
        assert!(decode("not json").is_err());
    }

    #[test]
    fn keyed_entries_serialize_ids() {
        let r = SaveRecord {
            version: SAVE_VERSION,
            cash: 1.0,
            timestamp: 2.0,
            businesses: vec![SavedUnit {
                id: Some(UnitId::new("car_wash")),
                count: 1,
                manager: true,
                multiplier: 2.0,
                last_time: 3.0,
            }],
        };
        let text = encode(&r).unwrap();
        assert!(text.contains("\"id\": \"car_wash\""));
        assert_eq!(decode(&text).unwrap(), r);
        assert!(r.is_keyed());
    }
}
