//! Sync types for pattern export/import.
//!
//! This module defines the JSON record written per pattern, the lenient
//! shape read back on import, run statistics, and per-file errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::SyncStatus;

/// One pattern as written to `<slug>.json`.
///
/// Field order is the on-disk order:
/// `{"title", "slug", "content", "categories", "syncStatus"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    /// Display title.
    pub title: String,
    /// Slug, optionally namespaced as `<prefix>/<slug>`.
    pub slug: String,
    /// Block markup.
    pub content: String,
    /// Category names, unique, in first-seen order.
    pub categories: Vec<String>,
    /// Whether the pattern follows its file source.
    pub sync_status: SyncStatus,
}

/// A record as read from disk, before validation.
///
/// Every field is optional because files are hand-editable; the importer
/// decides which absences are fatal for the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRecord {
    pub title: Option<String>,
    pub slug: Option<String>,
    /// `None` when absent or falsy (`null`, `false`, `0`, `""`, `"0"`).
    pub content: Option<String>,
    pub categories: Vec<String>,
    pub sync_status: Option<String>,
}

/// Statistics for an export operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportStats {
    /// Number of pattern files written.
    pub exported: usize,
    /// Number of patterns skipped because of an error.
    pub failed: usize,
    /// Destination directory.
    pub dir: PathBuf,
}

/// Statistics for an import operation.
///
/// In dry-run mode every count describes what would have happened.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    /// Number of new patterns created.
    pub created: usize,
    /// Number of existing patterns whose title or content changed.
    pub updated: usize,
    /// Number of existing patterns left as they were.
    pub unchanged: usize,
    /// Number of stored patterns removed because no file carried their slug.
    pub deleted: usize,
    /// Number of files or patterns skipped with a warning.
    pub skipped: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl ImportStats {
    /// Files that reached a create/update/unchanged decision.
    #[must_use]
    pub fn total_processed(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    /// Returns true if the run changed (or would change) the store.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.created + self.updated + self.deleted > 0
    }
}

/// Per-file sync errors.
///
/// These never abort a run; they are reported as warnings.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but is not a JSON object.
    #[error("expected a JSON object")]
    NotAnObject,

    /// A required field is absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The content store rejected an operation.
    #[error("{0}")]
    Store(#[from] crate::error::Error),
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
