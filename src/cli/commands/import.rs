//! Import command implementation.

use crate::cli::commands::open_storage;
use crate::cli::ImportArgs;
use crate::config::resolve_patterns_dir;
use crate::error::Result;
use crate::sync::{ConsoleReporter, ImportOptions, Importer};
use std::path::PathBuf;

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the database is missing or the source directory
/// does not exist. Per-file failures are only warned.
pub fn execute(
    args: &ImportArgs,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut storage = open_storage(db_path, actor)?;
    let dir = resolve_patterns_dir(args.dir.as_deref())?;

    let options = ImportOptions {
        dry_run: args.dry_run,
        verbose: !args.no_verbose,
    };
    let reporter = ConsoleReporter::new(json, quiet);

    let stats = Importer::new(&mut storage, options).import_dir(&dir, &reporter)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "dir": dir.display().to_string(),
            "processed": stats.total_processed(),
            "changed": stats.has_changes(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}
