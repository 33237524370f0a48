//! Pattern file sync.
//!
//! This module moves block patterns between the content store and a
//! directory of JSON files, one file per pattern:
//!
//! - **Export**: published patterns → `<slug>.json` (snapshot, overwrite)
//! - **Import**: `*.json` → store, reconciled by slug, then a deletion pass
//!   for patterns no file mentions
//! - **Slugs**: [`slugify`] derives and normalizes the join key on both sides
//!
//! # File Format
//!
//! ```json
//! {
//!     "title": "Hero Banner",
//!     "slug": "mytheme/hero-banner",
//!     "content": "<!-- wp:cover --> ... <!-- /wp:cover -->",
//!     "categories": ["Headers"],
//!     "syncStatus": "unsynced"
//! }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use psync::sync::{ConsoleReporter, ExportOptions, Exporter, ImportOptions, Importer};
//!
//! let reporter = ConsoleReporter::new(false, false);
//! Exporter::new(&storage, ExportOptions::new(&dir)).export(&reporter)?;
//!
//! let options = ImportOptions { dry_run: true, verbose: true };
//! let stats = Importer::new(&mut storage, options).import_dir(&dir, &reporter)?;
//! ```

mod export;
mod file;
mod import;
mod report;
mod slug;
mod types;

pub use export::{ExportOptions, Exporter};
pub use file::{atomic_write, encode_record, list_json_files, parse_record, read_record};
pub use import::{ImportOptions, Importer};
pub use report::{ConsoleReporter, RecordingReporter, ReportLevel, SyncReporter};
pub use slug::slugify;
pub use types::{
    ExportStats, ImportStats, IncomingRecord, PatternRecord, SyncError, SyncResult,
};
