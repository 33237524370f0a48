//! Version command implementation.

use crate::error::Result;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    schema: i32,
    build: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let output = VersionOutput {
        version: env!("CARGO_PKG_VERSION"),
        schema: CURRENT_SCHEMA_VERSION,
        build: if cfg!(debug_assertions) { "dev" } else { "release" },
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "psync {} (schema v{}, {})",
            output.version, output.schema, output.build
        );
    }
    Ok(())
}
