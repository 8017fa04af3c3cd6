#![deny(warnings)]

//! Upgrade a positional (version 1) save to the keyed format.
//!
//! Usage: migrate [SAVE_PATH] [--roster ROSTER_YAML]

use anyhow::{bail, Context, Result};
use persistence::{default_save_path, read_record, write_record, SAVE_VERSION};
use sim_core::{canonical_roster, load_roster};
use std::path::PathBuf;

fn main() -> Result<()> {
    let mut save: Option<PathBuf> = None;
    let mut roster_path: Option<PathBuf> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--roster" => roster_path = it.next().map(PathBuf::from),
            other => save = Some(PathBuf::from(other)),
        }
    }
    let save = save.unwrap_or_else(|| PathBuf::from(default_save_path()));
    let roster = match &roster_path {
        Some(p) => load_roster(p).with_context(|| format!("loading roster {}", p.display()))?,
        None => canonical_roster(),
    };

    let Some(mut record) =
        read_record(&save).with_context(|| format!("reading {}", save.display()))?
    else {
        bail!("no save at {}", save.display());
    };
    if record.is_keyed() {
        println!("{} is already keyed (version {})", save.display(), record.version);
        return Ok(());
    }
    if record.businesses.len() > roster.len() {
        bail!(
            "save has {} businesses but roster has {}; refusing to guess",
            record.businesses.len(),
            roster.len()
        );
    }
    for (entry, unit) in record.businesses.iter_mut().zip(&roster.units) {
        entry.id = Some(unit.id.clone());
    }
    record.version = SAVE_VERSION;
    write_record(&save, &record).with_context(|| format!("writing {}", save.display()))?;
    println!(
        "Migrated {} ({} businesses) to version {}",
        save.display(),
        record.businesses.len(),
        SAVE_VERSION
    );
    Ok(())
}
