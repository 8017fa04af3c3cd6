//! Save file reading and writing.

use crate::codec::{restore, serialize, LoadSource, Restored};
use crate::error::PersistenceError;
use crate::record::{decode, encode, SaveRecord};
use sim_core::{RosterConfig, Timestamp};
use sim_runtime::Portfolio;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read a record; `Ok(None)` when the file does not exist.
pub fn read_record(path: &Path) -> Result<Option<SaveRecord>, PersistenceError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    decode(&text).map(Some)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a record via a temporary sibling and rename, so a failed write
/// never clobbers the previous save.
pub fn write_record(path: &Path, record: &SaveRecord) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = encode(record)?;
    let tmp = temp_sibling(path);
    fs::write(&tmp, text)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!(path = %path.display(), "save written");
    Ok(())
}

/// Serialize and write the portfolio. In-memory state is never touched.
pub fn save_game(
    path: &Path,
    portfolio: &Portfolio,
    now: Timestamp,
) -> Result<SaveRecord, PersistenceError> {
    let record = serialize(portfolio, now);
    write_record(path, &record)?;
    Ok(record)
}

/// Load and restore a game, degrading to a fresh portfolio on any failure.
pub fn load_game(path: &Path, roster: &RosterConfig, now: Timestamp) -> Restored {
    match read_record(path) {
        Ok(Some(record)) => restore(&record, roster, now),
        Ok(None) => {
            info!(path = %path.display(), "no save found, starting fresh");
            Restored::fresh(roster, now, LoadSource::Missing)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable save, starting fresh");
            Restored::fresh(roster, now, LoadSource::Corrupt(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::canonical_roster;
    use tempfile::tempdir;

    const T0: Timestamp = 1_700_000_000.0;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let r = load_game(&dir.path().join("none.json"), &canonical_roster(), T0);
        assert_eq!(r.source, LoadSource::Missing);
        assert_eq!(r.portfolio, Portfolio::new(&canonical_roster(), T0));
        assert_eq!(r.offline_earnings, 0.0);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{\"cash\": \"lots\"").unwrap();
        let r = load_game(&path, &canonical_roster(), T0);
        assert!(matches!(r.source, LoadSource::Corrupt(_)));
        assert_eq!(r.portfolio.cash(), 0.0);
    }

    #[test]
    fn save_then_load_with_offline_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/save.json");
        let roster = canonical_roster();
        let mut p = Portfolio::new(&roster, T0);
        p.grant(0, 3).unwrap();
        p.set_cash(400.0);
        p.hire_manager(0).unwrap();
        let record = save_game(&path, &p, T0).unwrap();
        assert_eq!(record.timestamp, T0);
        assert!(!temp_sibling(&path).exists());

        let r = load_game(&path, &roster, T0 + 4.5);
        assert_eq!(r.source, LoadSource::Saved);
        assert_eq!(r.offline_earnings, 12.0);
        assert_eq!(r.portfolio.cash(), 12.0);
        assert_eq!(r.portfolio.units()[0].last_collection(), T0 + 4.0);
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        let roster = canonical_roster();
        let p = Portfolio::new(&roster, T0);
        save_game(&path, &p, T0).unwrap();
        let before = fs::read_to_string(&path).unwrap();
        // A directory where the temp file should go makes the write fail.
        fs::create_dir(temp_sibling(&path)).unwrap();
        assert!(save_game(&path, &p, T0 + 1.0).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}
