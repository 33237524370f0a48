//! Pattern import.
//!
//! Reconciles a directory of pattern records against the store:
//!
//! 1. Every `*.json` file is validated and its slug normalized.
//! 2. The slug is looked up; the pattern is created, updated when title or
//!    content differ, or left unchanged. Categories and sync status are
//!    reapplied in every case.
//! 3. Stored patterns whose slug no file carried are deleted.
//!
//! Per-file and per-pattern failures are warnings. Only a missing source
//! directory aborts the run.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{NewPattern, SyncStatus, SYNC_STATUS_META_KEY};
use crate::storage::ContentStore;
use crate::sync::file::{list_json_files, read_record};
use crate::sync::report::SyncReporter;
use crate::sync::slug::slugify;
use crate::sync::types::{ImportStats, IncomingRecord, SyncError, SyncResult};

/// Flags for an import run.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Report intended changes without touching the store.
    pub dry_run: bool,
    /// Send per-pattern detail lines to the reporter.
    pub verbose: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: true,
        }
    }
}

/// A record that passed validation.
struct ValidRecord {
    slug: String,
    title: String,
    content: String,
    categories: Vec<String>,
    sync_status: SyncStatus,
}

impl ValidRecord {
    fn from_incoming(record: IncomingRecord) -> SyncResult<Self> {
        let slug = record.slug.as_deref().map(slugify).unwrap_or_default();
        if slug.is_empty() {
            return Err(SyncError::MissingField("slug"));
        }
        let content = record.content.ok_or(SyncError::MissingField("content"))?;
        let title = record
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| slug.clone());

        Ok(Self {
            sync_status: SyncStatus::from_raw(record.sync_status.as_deref()),
            categories: record.categories,
            slug,
            title,
            content,
        })
    }

    fn as_new_pattern(&self) -> NewPattern {
        NewPattern::published(&self.slug, &self.title, &self.content)
    }
}

/// Importer for pattern files.
pub struct Importer<'a, S: ContentStore + ?Sized> {
    store: &'a mut S,
    options: ImportOptions,
}

impl<'a, S: ContentStore + ?Sized> Importer<'a, S> {
    #[must_use]
    pub fn new(store: &'a mut S, options: ImportOptions) -> Self {
        Self { store, options }
    }

    /// Import every record in `dir` and delete patterns no record mentions.
    ///
    /// A directory with no `*.json` files is a no-op: nothing is created and
    /// the deletion pass does not run.
    ///
    /// # Errors
    ///
    /// Returns `Error::DirectoryNotFound` if `dir` is not a directory, or an
    /// I/O error if it cannot be listed.
    pub fn import_dir(&mut self, dir: &Path, reporter: &dyn SyncReporter) -> Result<ImportStats> {
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut stats = ImportStats {
            dry_run: self.options.dry_run,
            ..ImportStats::default()
        };

        let files = list_json_files(dir)?;
        if files.is_empty() {
            reporter.success(&format!(
                "No JSON files found in {}; nothing to import.",
                dir.display()
            ));
            return Ok(stats);
        }
        debug!(count = files.len(), dir = %dir.display(), dry_run = self.options.dry_run, "Importing patterns");

        let mut seen = HashSet::new();
        for path in &files {
            self.import_file(path, &mut seen, &mut stats, reporter);
        }

        self.delete_missing(&seen, &mut stats, reporter);

        let marker = if self.options.dry_run { "[DRY] " } else { "" };
        reporter.success(&format!(
            "{marker}Done. Created: {}, Updated: {}, Unchanged: {}, Deleted: {}",
            stats.created, stats.updated, stats.unchanged, stats.deleted
        ));

        Ok(stats)
    }

    fn import_file(
        &mut self,
        path: &Path,
        seen: &mut HashSet<String>,
        stats: &mut ImportStats,
        reporter: &dyn SyncReporter,
    ) {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        let record = match read_record(path).and_then(ValidRecord::from_incoming) {
            Ok(record) => record,
            Err(e) => {
                let message = match &e {
                    SyncError::Io(err) => format!("Cannot read {name}: {err}"),
                    SyncError::Json(err) => format!("Invalid JSON in {name}: {err}"),
                    SyncError::NotAnObject => format!("Invalid JSON in {name}: {e}"),
                    SyncError::MissingField(_) | SyncError::Store(_) => {
                        format!("Skip {name} (needs slug+content)")
                    }
                };
                warn!(file = %name, "Skipping pattern file");
                reporter.warning(&message);
                stats.skipped += 1;
                return;
            }
        };

        // Seen before lookup: a failed create or update must not let the
        // deletion pass remove a same-slug pattern.
        seen.insert(record.slug.clone());

        let existing = match self.store.find_by_slug(&record.slug) {
            Ok(existing) => existing,
            Err(e) => {
                reporter.warning(&format!("Lookup failed for {}: {e}", record.slug));
                stats.skipped += 1;
                return;
            }
        };

        let options = self.options;
        let slug = &record.slug;

        match existing {
            None => {
                debug!(slug = %slug, "create");
                if options.dry_run {
                    log(options, reporter, &format!("[DRY] Would create {slug}"));
                    stats.created += 1;
                    return;
                }
                match self.store.create(&record.as_new_pattern()) {
                    Ok(id) => {
                        reporter.success(&format!("Created {slug} (#{id})"));
                        self.reconcile(id, &record, reporter);
                        stats.created += 1;
                    }
                    Err(e) => {
                        warn!(slug = %slug, error = %e, "Create failed");
                        reporter.warning(&format!("Create failed for {slug}: {e}"));
                        stats.skipped += 1;
                    }
                }
            }
            Some(current) if current.title != record.title || current.content != record.content => {
                let id = current.id;
                debug!(slug = %slug, id, "update");
                if options.dry_run {
                    log(options, reporter, &format!("[DRY] Would update {slug} (#{id})"));
                    self.reconcile(id, &record, reporter);
                    stats.updated += 1;
                    return;
                }
                match self.store.update(id, &record.as_new_pattern()) {
                    Ok(()) => {
                        reporter.success(&format!("Updated {slug} (#{id})"));
                        self.reconcile(id, &record, reporter);
                        stats.updated += 1;
                    }
                    Err(e) => {
                        warn!(slug = %slug, id, error = %e, "Update failed");
                        reporter.warning(&format!("Update failed for {slug} (#{id}): {e}"));
                        stats.skipped += 1;
                    }
                }
            }
            Some(current) => {
                let id = current.id;
                debug!(slug = %slug, id, "unchanged");
                log(options, reporter, &format!("Unchanged {slug} (#{id})"));
                if !options.dry_run {
                    self.reconcile(id, &record, reporter);
                }
                stats.unchanged += 1;
            }
        }
    }

    /// Reapply categories and sync status.
    fn reconcile(&mut self, id: i64, record: &ValidRecord, reporter: &dyn SyncReporter) {
        ensure_terms(&mut *self.store, id, &record.categories, self.options, reporter);
        apply_sync_status(&mut *self.store, id, record.sync_status, self.options, reporter);
    }

    fn delete_missing(
        &mut self,
        seen: &HashSet<String>,
        stats: &mut ImportStats,
        reporter: &dyn SyncReporter,
    ) {
        let all = match self.store.list_all() {
            Ok(all) => all,
            Err(e) => {
                reporter.warning(&format!("Cannot list patterns for deletion: {e}"));
                return;
            }
        };

        for (id, slug) in all {
            if seen.contains(&slug) {
                continue;
            }
            debug!(slug = %slug, id, "delete");

            if self.options.dry_run {
                log(
                    self.options,
                    reporter,
                    &format!("[DRY] Would delete missing {slug} (#{id})"),
                );
                stats.deleted += 1;
                continue;
            }

            match self.store.delete(id) {
                Ok(()) => {
                    reporter.success(&format!("Deleted missing {slug} (#{id})"));
                    stats.deleted += 1;
                }
                Err(e) => {
                    warn!(slug = %slug, id, error = %e, "Delete failed");
                    reporter.warning(&format!("Failed to delete {slug} (#{id}): {e}"));
                }
            }
        }
    }
}

fn log(options: ImportOptions, reporter: &dyn SyncReporter, message: &str) {
    if options.verbose {
        reporter.log(message);
    }
}

/// Resolve category names to terms, creating missing ones, and assign them.
///
/// An empty list leaves existing assignments alone.
fn ensure_terms<S: ContentStore + ?Sized>(
    store: &mut S,
    id: i64,
    categories: &[String],
    options: ImportOptions,
    reporter: &dyn SyncReporter,
) {
    if categories.is_empty() {
        return;
    }

    let mut term_ids: Vec<i64> = Vec::new();
    for name in categories.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        let found = match store.find_term(name) {
            Ok(found) => found,
            Err(e) => {
                reporter.warning(&format!("Term lookup failed for '{name}': {e}"));
                continue;
            }
        };

        let term_id = match found {
            Some(term_id) => term_id,
            None if options.dry_run => {
                log(options, reporter, &format!("[DRY] Would create term '{name}'"));
                continue;
            }
            None => match store.create_term(name) {
                Ok(term_id) => term_id,
                Err(e) => {
                    reporter.warning(&format!("Cannot create term '{name}': {e}"));
                    continue;
                }
            },
        };

        if !term_ids.contains(&term_id) {
            term_ids.push(term_id);
        }
    }

    if term_ids.is_empty() {
        return;
    }

    if options.dry_run {
        let joined = term_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        log(options, reporter, &format!("[DRY] Would assign terms to #{id}: {joined}"));
        return;
    }

    if let Err(e) = store.assign_terms(id, &term_ids) {
        reporter.warning(&format!("Cannot assign terms to #{id}: {e}"));
    }
}

/// Persist `unsynced` as metadata, or clear it so the pattern reads as synced.
fn apply_sync_status<S: ContentStore + ?Sized>(
    store: &mut S,
    id: i64,
    status: SyncStatus,
    options: ImportOptions,
    reporter: &dyn SyncReporter,
) {
    let result = match (status, options.dry_run) {
        (SyncStatus::Unsynced, true) => {
            log(options, reporter, &format!("[DRY] Would set syncStatus=unsynced on #{id}"));
            Ok(())
        }
        (SyncStatus::Synced, true) => {
            log(options, reporter, &format!("[DRY] Would clear syncStatus meta on #{id} (synced)"));
            Ok(())
        }
        (SyncStatus::Unsynced, false) => {
            store.set_meta(id, SYNC_STATUS_META_KEY, SyncStatus::Unsynced.as_str())
        }
        (SyncStatus::Synced, false) => store.delete_meta(id, SYNC_STATUS_META_KEY),
    };

    if let Err(e) = result {
        reporter.warning(&format!("Cannot update sync status on #{id}: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pattern, PostStatus};
    use crate::storage::SqliteStorage;
    use crate::sync::export::{ExportOptions, Exporter};
    use crate::sync::report::{RecordingReporter, ReportLevel};
    use std::fs;
    use tempfile::TempDir;

    const HERO: &str = r#"{"title":"Hero Banner","slug":"hero-banner","content":"<div/>","categories":["Headers","Headers"],"syncStatus":"unsynced"}"#;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn run(storage: &mut SqliteStorage, dir: &Path, dry_run: bool) -> (ImportStats, RecordingReporter) {
        let reporter = RecordingReporter::new();
        let options = ImportOptions {
            dry_run,
            verbose: true,
        };
        let stats = Importer::new(storage, options)
            .import_dir(dir, &reporter)
            .unwrap();
        (stats, reporter)
    }

    /// Snapshot of everything an import can touch.
    fn store_state(storage: &SqliteStorage) -> Vec<(Pattern, Vec<String>, Option<String>)> {
        storage
            .list_patterns(true)
            .unwrap()
            .into_iter()
            .map(|p| {
                let terms = storage.get_terms(p.id).unwrap();
                let meta = storage.get_meta(p.id, SYNC_STATUS_META_KEY).unwrap();
                (p, terms, meta)
            })
            .collect()
    }

    /// Store wrapper that hides lookups and rejects creates.
    struct FlakyStore {
        inner: SqliteStorage,
        hide_lookups: bool,
        fail_creates: bool,
    }

    impl ContentStore for FlakyStore {
        fn query_published(&self) -> Result<Vec<Pattern>> {
            self.inner.query_published()
        }
        fn list_all(&self) -> Result<Vec<(i64, String)>> {
            self.inner.list_all()
        }
        fn find_by_slug(&self, slug: &str) -> Result<Option<Pattern>> {
            if self.hide_lookups {
                return Ok(None);
            }
            self.inner.find_by_slug(slug)
        }
        fn create(&mut self, pattern: &NewPattern) -> Result<i64> {
            if self.fail_creates {
                return Err(Error::Other("create rejected".to_string()));
            }
            self.inner.create(pattern)
        }
        fn update(&mut self, id: i64, pattern: &NewPattern) -> Result<()> {
            self.inner.update(id, pattern)
        }
        fn delete(&mut self, id: i64) -> Result<()> {
            self.inner.delete(id)
        }
        fn get_terms(&self, id: i64) -> Result<Vec<String>> {
            self.inner.get_terms(id)
        }
        fn find_term(&self, name: &str) -> Result<Option<i64>> {
            self.inner.find_term(name)
        }
        fn create_term(&mut self, name: &str) -> Result<i64> {
            self.inner.create_term(name)
        }
        fn assign_terms(&mut self, id: i64, term_ids: &[i64]) -> Result<()> {
            self.inner.assign_terms(id, term_ids)
        }
        fn get_meta(&self, id: i64, key: &str) -> Result<Option<String>> {
            self.inner.get_meta(id, key)
        }
        fn set_meta(&mut self, id: i64, key: &str, value: &str) -> Result<()> {
            self.inner.set_meta(id, key, value)
        }
        fn delete_meta(&mut self, id: i64, key: &str) -> Result<()> {
            self.inner.delete_meta(id, key)
        }
    }

    #[test]
    fn test_import_creates_with_terms_and_status() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "hero-banner.json", HERO);
        let mut storage = SqliteStorage::open_memory().unwrap();

        let (stats, reporter) = run(&mut storage, temp_dir.path(), false);

        assert_eq!(stats.created, 1);
        assert_eq!(stats.updated + stats.unchanged + stats.deleted, 0);
        let hero = storage.find_by_slug("hero-banner").unwrap().unwrap();
        assert_eq!(hero.title, "Hero Banner");
        assert_eq!(hero.status, PostStatus::Publish);
        assert_eq!(storage.get_terms(hero.id).unwrap(), vec!["Headers"]);
        assert_eq!(
            storage.get_meta(hero.id, SYNC_STATUS_META_KEY).unwrap().as_deref(),
            Some("unsynced")
        );
        assert!(reporter.contains(&format!("Created hero-banner (#{})", hero.id)));
        assert!(reporter.contains("Done. Created: 1, Updated: 0, Unchanged: 0, Deleted: 0"));
    }

    #[test]
    fn test_second_import_is_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "hero-banner.json", HERO);
        let mut storage = SqliteStorage::open_memory().unwrap();

        run(&mut storage, temp_dir.path(), false);
        let before = store_state(&storage);
        let (stats, _) = run(&mut storage, temp_dir.path(), false);

        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.updated, 0);
        assert_eq!(store_state(&storage), before);
    }

    #[test]
    fn test_changed_content_updates_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let id = storage
            .create(&NewPattern::published("hero-banner", "Hero Banner", "<p>old</p>"))
            .unwrap();
        storage.set_meta(id, SYNC_STATUS_META_KEY, "unsynced").unwrap();
        write(
            temp_dir.path(),
            "hero.json",
            r#"{"title":"Hero Banner","slug":"hero-banner","content":"<p>new</p>"}"#,
        );

        let (stats, reporter) = run(&mut storage, temp_dir.path(), false);

        assert_eq!(stats.updated, 1);
        let hero = storage.get_pattern(id).unwrap().unwrap();
        assert_eq!(hero.content, "<p>new</p>");
        // Absent syncStatus falls back to synced, which clears the flag
        assert!(storage.get_meta(id, SYNC_STATUS_META_KEY).unwrap().is_none());
        assert!(reporter.contains(&format!("Updated hero-banner (#{id})")));
    }

    #[test]
    fn test_missing_slug_is_deleted() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "hero-banner.json", HERO);
        let mut storage = SqliteStorage::open_memory().unwrap();
        let old = storage
            .create(&NewPattern::published("old-cta", "Old CTA", "<div/>"))
            .unwrap();

        let (stats, reporter) = run(&mut storage, temp_dir.path(), false);

        assert_eq!(stats.deleted, 1);
        assert!(storage.get_pattern(old).unwrap().is_none());
        assert!(storage.find_by_slug("hero-banner").unwrap().is_some());
        assert!(reporter.contains(&format!("Deleted missing old-cta (#{old})")));
        assert!(reporter.contains("Deleted: 1"));
    }

    #[test]
    fn test_dry_run_leaves_store_untouched() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "hero-banner.json", HERO);
        write(
            temp_dir.path(),
            "footer.json",
            r#"{"title":"Footer v2","slug":"footer","content":"<footer/>","categories":["Footers"]}"#,
        );
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .create(&NewPattern::published("footer", "Footer", "<footer/>"))
            .unwrap();
        storage
            .create(&NewPattern::published("old-cta", "Old CTA", "<div/>"))
            .unwrap();
        let before = store_state(&storage);
        let events_before = storage.recent_events(100).unwrap().len();

        let (stats, reporter) = run(&mut storage, temp_dir.path(), true);

        assert!(stats.dry_run);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.deleted, 1);
        assert_eq!(store_state(&storage), before);
        assert_eq!(storage.recent_events(100).unwrap().len(), events_before);
        assert!(storage.find_term("Footers").unwrap().is_none());
        assert!(reporter.contains("[DRY] Would create hero-banner"));
        assert!(reporter.contains("[DRY] Would create term 'Footers'"));
        assert!(reporter.contains("[DRY] Would delete missing old-cta"));
        assert!(reporter.contains("[DRY] Done. Created: 1, Updated: 1, Unchanged: 0, Deleted: 1"));
    }

    #[test]
    fn test_dry_run_with_only_new_terms_skips_assign_line() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "footer.json",
            r#"{"title":"Footer v2","slug":"footer","content":"<footer/>","categories":["Brand New"]}"#,
        );
        let mut storage = SqliteStorage::open_memory().unwrap();
        let footer = storage
            .create(&NewPattern::published("footer", "Footer", "<footer/>"))
            .unwrap();
        let headers = storage.find_or_create_term("Headers").unwrap();

        let (_, reporter) = run(&mut storage, temp_dir.path(), true);

        assert!(reporter.contains("[DRY] Would create term 'Brand New'"));
        assert!(!reporter.contains(&format!("Would assign terms to #{footer}")));

        // A known term still produces the assign line
        write(
            temp_dir.path(),
            "footer.json",
            r#"{"title":"Footer v2","slug":"footer","content":"<footer/>","categories":["Headers","Brand New"]}"#,
        );
        let (_, reporter) = run(&mut storage, temp_dir.path(), true);
        assert!(reporter.contains(&format!("[DRY] Would assign terms to #{footer}: {headers}")));
    }

    #[test]
    fn test_export_then_import_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let hero = storage
            .create(&NewPattern::published("hero-banner", "Hero Banner", "<div/>"))
            .unwrap();
        let term = storage.find_or_create_term("Headers").unwrap();
        storage.assign_terms(hero, &[term]).unwrap();
        storage.set_meta(hero, SYNC_STATUS_META_KEY, "unsynced").unwrap();
        storage
            .create(&NewPattern::published("call-to-action", "Call To Action!", "<a/>"))
            .unwrap();
        let before = store_state(&storage);

        Exporter::new(&storage, ExportOptions::new(temp_dir.path()))
            .export(&RecordingReporter::new())
            .unwrap();
        let (stats, _) = run(&mut storage, temp_dir.path(), false);

        assert_eq!(stats.created, 0);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(store_state(&storage), before);
    }

    #[test]
    fn test_prefixed_export_reimports_under_joined_slug() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let hero = storage
            .create(&NewPattern::published("hero-banner", "Hero Banner", "<div/>"))
            .unwrap();

        Exporter::new(
            &storage,
            ExportOptions::new(temp_dir.path()).with_prefix("mytheme"),
        )
        .export(&RecordingReporter::new())
        .unwrap();
        let (stats, reporter) = run(&mut storage, temp_dir.path(), false);

        // The slash is not a slug character, so the prefix is folded in
        assert_eq!(stats.created, 1);
        assert_eq!(stats.deleted, 1);
        assert!(storage.get_pattern(hero).unwrap().is_none());
        assert!(storage.find_by_slug("mythemehero-banner").unwrap().is_some());
        assert!(reporter.contains(&format!("Deleted missing hero-banner (#{hero})")));
    }

    #[test]
    fn test_invalid_files_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(dir, "a-broken.json", "{not json");
        write(dir, "b-no-slug.json", r#"{"title":"No Slug","content":"<div/>"}"#);
        write(dir, "c-no-content.json", r#"{"slug":"empty","content":""}"#);
        write(dir, "d-zero.json", r#"{"slug":"zero","content":"0"}"#);
        write(dir, "e-array.json", "[]");
        write(dir, "f-good.json", r#"{"slug":"Good One","content":"<div/>"}"#);
        let mut storage = SqliteStorage::open_memory().unwrap();
        let zero = storage
            .create(&NewPattern::published("zero", "Zero", "<div/>"))
            .unwrap();

        let (stats, reporter) = run(&mut storage, dir, false);

        assert_eq!(stats.skipped, 5);
        assert_eq!(stats.created, 1);
        let warnings = reporter.messages(ReportLevel::Warning);
        assert_eq!(warnings.len(), 5);
        assert!(warnings[0].starts_with("Invalid JSON in a-broken.json"));
        assert_eq!(warnings[1], "Skip b-no-slug.json (needs slug+content)");
        assert!(warnings[4].starts_with("Invalid JSON in e-array.json"));

        // Skipped files never join the seen set
        assert!(storage.get_pattern(zero).unwrap().is_none());
        let good = storage.find_by_slug("good-one").unwrap().unwrap();
        assert_eq!(good.title, "good-one");
    }

    #[test]
    fn test_empty_directory_skips_deletion() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "readme.txt", "not a pattern");
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .create(&NewPattern::published("keep-me", "Keep Me", "<div/>"))
            .unwrap();

        let (stats, reporter) = run(&mut storage, temp_dir.path(), false);

        assert_eq!(stats.deleted, 0);
        assert_eq!(storage.count_patterns().unwrap(), 1);
        assert!(reporter.contains("No JSON files found"));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();

        let err = Importer::new(&mut storage, ImportOptions::default())
            .import_dir(&temp_dir.path().join("nope"), &RecordingReporter::new())
            .unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_failed_create_still_marks_slug_seen() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "hero-banner.json", HERO);
        let mut inner = SqliteStorage::open_memory().unwrap();
        let existing = inner
            .create(&NewPattern::published("hero-banner", "Hero Banner", "<div/>"))
            .unwrap();
        let mut store = FlakyStore {
            inner,
            hide_lookups: true,
            fail_creates: true,
        };

        let reporter = RecordingReporter::new();
        let stats = Importer::new(&mut store, ImportOptions::default())
            .import_dir(temp_dir.path(), &reporter)
            .unwrap();

        assert_eq!(stats.created, 0);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.deleted, 0);
        assert!(store.inner.get_pattern(existing).unwrap().is_some());
        assert!(reporter.contains("Create failed for hero-banner"));
    }

    #[test]
    fn test_slug_is_normalized() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "prefixed.json",
            r#"{"title":"Hero","slug":"MyTheme/Hero Banner","content":"<div/>"}"#,
        );
        let mut storage = SqliteStorage::open_memory().unwrap();

        run(&mut storage, temp_dir.path(), false);

        assert!(storage.find_by_slug("mythemehero-banner").unwrap().is_some());
    }

    #[test]
    fn test_quiet_run_only_reports_successes_and_warnings() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "hero-banner.json", HERO);
        let mut storage = SqliteStorage::open_memory().unwrap();
        run(&mut storage, temp_dir.path(), false);

        let reporter = RecordingReporter::new();
        let options = ImportOptions {
            dry_run: false,
            verbose: false,
        };
        Importer::new(&mut storage, options)
            .import_dir(temp_dir.path(), &reporter)
            .unwrap();

        assert!(reporter.messages(ReportLevel::Log).is_empty());
        assert_eq!(reporter.messages(ReportLevel::Success).len(), 1);
    }
}
