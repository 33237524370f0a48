//! Pattern export.
//!
//! Projects every published pattern into a `<slug>.json` record in the
//! target directory. Exports are snapshots: existing files of the same name
//! are overwritten, and files for patterns that no longer exist are left
//! alone.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Pattern, SyncStatus, SYNC_STATUS_META_KEY};
use crate::storage::ContentStore;
use crate::sync::file::{atomic_write, encode_record};
use crate::sync::report::SyncReporter;
use crate::sync::slug::slugify;
use crate::sync::types::{ExportStats, PatternRecord, SyncResult};

/// Options for an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Destination directory, created if absent.
    pub dir: PathBuf,
    /// Pretty-print with four-space indentation.
    pub pretty: bool,
    /// Namespace written in front of each slug as `<prefix>/<slug>`.
    /// Empty means no namespace.
    pub prefix: String,
}

impl ExportOptions {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pretty: true,
            prefix: String::new(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Exporter for pattern files.
///
/// Reads only; the store is never mutated.
pub struct Exporter<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    options: ExportOptions,
}

impl<'a, S: ContentStore + ?Sized> Exporter<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, options: ExportOptions) -> Self {
        Self { store, options }
    }

    /// Write one file per published pattern.
    ///
    /// A pattern that fails to serialize or write is reported as a warning
    /// and counted in `failed`; the run continues.
    ///
    /// # Errors
    ///
    /// Returns `Error::CreateDirectory` if the destination cannot be created,
    /// or a database error if published patterns cannot be listed.
    pub fn export(&self, reporter: &dyn SyncReporter) -> Result<ExportStats> {
        let dir = &self.options.dir;
        fs::create_dir_all(dir).map_err(|source| Error::CreateDirectory {
            path: dir.clone(),
            source,
        })?;

        let patterns = self.store.query_published()?;
        debug!(count = patterns.len(), dir = %dir.display(), "Exporting patterns");

        let mut stats = ExportStats {
            dir: dir.clone(),
            ..ExportStats::default()
        };

        for pattern in &patterns {
            match self.export_pattern(pattern, reporter) {
                Ok((slug, path)) => {
                    reporter.success(&format!("[OK] {slug} -> {}", path.display()));
                    stats.exported += 1;
                }
                Err(e) => {
                    warn!(id = pattern.id, error = %e, "Pattern export failed");
                    reporter.warning(&format!("Failed to export {} (#{}): {e}", pattern.slug, pattern.id));
                    stats.failed += 1;
                }
            }
        }

        reporter.success(&format!(
            "Exported {} pattern(s) to {}",
            stats.exported,
            dir.display()
        ));

        Ok(stats)
    }

    /// Build and write the record for one pattern, returning its slug and path.
    fn export_pattern(
        &self,
        pattern: &Pattern,
        reporter: &dyn SyncReporter,
    ) -> SyncResult<(String, PathBuf)> {
        let base = file_stem(pattern);
        if base != slugify(&pattern.title) {
            reporter.warning(&format!(
                "Title of #{} has no slug characters; writing {base}.json",
                pattern.id
            ));
        }

        let slug = if self.options.prefix.is_empty() {
            base.clone()
        } else {
            format!("{}/{base}", self.options.prefix)
        };

        let categories = dedup_preserving_order(self.store.get_terms(pattern.id)?);
        let sync_status =
            SyncStatus::from_raw(self.store.get_meta(pattern.id, SYNC_STATUS_META_KEY)?.as_deref());

        let record = PatternRecord {
            title: pattern.title.clone(),
            slug: slug.clone(),
            content: pattern.content.clone(),
            categories,
            sync_status,
        };

        let path = self.options.dir.join(format!("{base}.json"));
        atomic_write(&path, &encode_record(&record, self.options.pretty)?)?;

        Ok((slug, path))
    }
}

/// File name (without extension) and unprefixed slug for a pattern.
///
/// Falls back to the stored slug, then the id, when the title yields nothing.
fn file_stem(pattern: &Pattern) -> String {
    let from_title = slugify(&pattern.title);
    if !from_title.is_empty() {
        return from_title;
    }
    let from_slug = slugify(&pattern.slug);
    if !from_slug.is_empty() {
        return from_slug;
    }
    format!("pattern-{}", pattern.id)
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}
