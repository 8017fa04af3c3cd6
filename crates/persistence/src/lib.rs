#![deny(warnings)]

//! Persistence layer: save records, restore with offline catch-up, file I/O.

mod codec;
mod error;
mod record;
mod store;

pub use codec::{restore, serialize, LoadSource, Restored, RosterMismatch};
pub use error::PersistenceError;
pub use record::{decode, encode, SaveRecord, SavedUnit, SAVE_VERSION};
pub use store::{load_game, read_record, save_game, write_record};

/// Returns the default save file used for local games.
pub fn default_save_path() -> &'static str {
    "saves/tycoon.json"
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn save_path_is_json() {
        assert!(default_save_path().ends_with(".json"));
    }
}
