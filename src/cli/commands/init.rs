//! Create the pattern database.
//!
//! The database is global (`~/.psync/data/patterns.db` unless `--db` or
//! `PSYNC_DB` say otherwise). Pattern files stay per-project.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    recreated: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the database exists and `force` is not
/// set, or an error if the directory or database cannot be created.
pub fn execute(db_path: Option<&PathBuf>, force: bool, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(|p| p.as_path()))
        .ok_or_else(|| Error::Config("Could not determine the database location".to_string()))?;

    let exists = db_path.exists();
    if exists && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if exists {
        remove_database(&db_path)?;
    }

    // Opening applies the schema
    SqliteStorage::open(&db_path)?;

    if json {
        let output = InitOutput {
            database: db_path,
            recreated: exists,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Initialized pattern database");
        println!("  Database: {}", db_path.display());
    }

    Ok(())
}

/// Remove a database file along with its WAL sidecars.
fn remove_database(db_path: &Path) -> Result<()> {
    fs::remove_file(db_path)?;
    for suffix in ["-wal", "-shm"] {
        let mut sidecar = db_path.as_os_str().to_owned();
        sidecar.push(suffix);
        let sidecar = PathBuf::from(sidecar);
        if sidecar.exists() {
            fs::remove_file(sidecar)?;
        }
    }
    Ok(())
}
