//! Export command implementation.

use crate::cli::commands::open_storage;
use crate::cli::ExportArgs;
use crate::config::{resolve_patterns_dir, resolve_prefix};
use crate::error::Result;
use crate::sync::{ConsoleReporter, ExportOptions, Exporter};
use std::path::PathBuf;

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the database is missing or the destination
/// directory cannot be created. Per-pattern failures are only warned.
pub fn execute(
    args: &ExportArgs,
    db_path: Option<&PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let storage = open_storage(db_path, None)?;
    let dir = resolve_patterns_dir(args.dir.as_deref())?;
    let prefix = resolve_prefix(args.prefix.as_deref())?;

    let options = ExportOptions::new(dir)
        .with_prefix(&prefix)
        .with_pretty(args.pretty());
    let reporter = ConsoleReporter::new(json, quiet);

    let stats = Exporter::new(&storage, options).export(&reporter)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "prefix": prefix,
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}
