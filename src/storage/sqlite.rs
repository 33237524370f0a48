//! SQLite storage implementation.
//!
//! This module provides the bundled content store backend. Every write goes
//! through [`SqliteStorage::mutate`] so it runs in its own transaction and
//! leaves an audit event behind.

use crate::error::{Error, Result};
use crate::model::{NewPattern, Pattern, PostStatus, PATTERN_CATEGORY_TAXONOMY};
use crate::storage::events::{insert_event, recent_events, Event, EventType};
use crate::storage::schema::apply_schema;
use crate::storage::ContentStore;
use crate::sync::slugify;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;

/// Actor recorded on audit events when none is configured.
const DEFAULT_ACTOR: &str = "psync";

const PATTERN_COLUMNS: &str = "id, slug, title, content, status, created_at, updated_at";

/// SQLite-based content store.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
    actor: String,
}

/// Context for a mutation operation, tracking side effects.
///
/// Passed to mutation closures so they can record audit events that are
/// written in the same transaction as the change itself.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Actor performing the operation.
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event with old/new values for field tracking.
    pub fn record_change(
        &mut self,
        entity_type: &str,
        entity_id: &str,
        event_type: EventType,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.events.push(
            Event::new(entity_type, entity_id, event_type, &self.actor)
                .with_values(old_value, new_value),
        );
    }
}

fn map_pattern(row: &rusqlite::Row) -> rusqlite::Result<Pattern> {
    Ok(Pattern {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        status: PostStatus::from_str(&row.get::<_, String>(4)?),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Fail with `PatternIdNotFound` unless a pattern row exists.
fn ensure_pattern(tx: &Transaction, id: i64) -> Result<String> {
    tx.query_row("SELECT slug FROM patterns WHERE id = ?1", [id], |row| {
        row.get(0)
    })
    .optional()?
    .ok_or(Error::PatternIdNotFound { id })
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self {
            conn,
            actor: DEFAULT_ACTOR.to_string(),
        })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            conn,
            actor: DEFAULT_ACTOR.to_string(),
        })
    }

    /// Set the actor recorded on audit events.
    #[must_use]
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = actor.to_string();
        self
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, &self.actor);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;

        Ok(result)
    }

    // ==================
    // Read helpers
    // ==================

    /// Get a pattern by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_pattern(&self, id: i64) -> Result<Option<Pattern>> {
        let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], map_pattern).optional()?)
    }

    /// List patterns ordered by slug, optionally including drafts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_patterns(&self, include_drafts: bool) -> Result<Vec<Pattern>> {
        if !include_drafts {
            return self.query_published();
        }

        let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns ORDER BY slug ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_pattern)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Count stored patterns of any status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_patterns(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patterns", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Most recent audit events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_events(&self, limit: u32) -> Result<Vec<Event>> {
        Ok(recent_events(&self.conn, limit)?)
    }
}

impl ContentStore for SqliteStorage {
    fn query_published(&self) -> Result<Vec<Pattern>> {
        let sql = format!(
            "SELECT {PATTERN_COLUMNS} FROM patterns WHERE status = ?1 ORDER BY slug ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([PostStatus::Publish.as_str()], map_pattern)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list_all(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, slug FROM patterns ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Pattern>> {
        let sql = format!("SELECT {PATTERN_COLUMNS} FROM patterns WHERE slug = ?1");
        Ok(self.conn.query_row(&sql, [slug], map_pattern).optional()?)
    }

    fn create(&mut self, pattern: &NewPattern) -> Result<i64> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("create_pattern", |tx, ctx| {
            let taken = tx
                .prepare("SELECT 1 FROM patterns WHERE slug = ?1")?
                .exists([&pattern.slug])?;
            if taken {
                return Err(Error::SlugExists {
                    slug: pattern.slug.clone(),
                });
            }

            tx.execute(
                "INSERT INTO patterns (slug, title, content, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![
                    pattern.slug,
                    pattern.title,
                    pattern.content,
                    pattern.status.as_str(),
                    now
                ],
            )?;
            let id = tx.last_insert_rowid();

            ctx.record_change(
                "pattern",
                &id.to_string(),
                EventType::PatternCreated,
                None,
                Some(pattern.slug.clone()),
            );

            Ok(id)
        })
    }

    fn update(&mut self, id: i64, pattern: &NewPattern) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("update_pattern", |tx, ctx| {
            let old_slug = ensure_pattern(tx, id)?;

            let taken = tx
                .prepare("SELECT 1 FROM patterns WHERE slug = ?1 AND id != ?2")?
                .exists(rusqlite::params![pattern.slug, id])?;
            if taken {
                return Err(Error::SlugExists {
                    slug: pattern.slug.clone(),
                });
            }

            tx.execute(
                "UPDATE patterns SET slug = ?1, title = ?2, content = ?3, status = ?4, updated_at = ?5
                 WHERE id = ?6",
                rusqlite::params![
                    pattern.slug,
                    pattern.title,
                    pattern.content,
                    pattern.status.as_str(),
                    now,
                    id
                ],
            )?;

            ctx.record_change(
                "pattern",
                &id.to_string(),
                EventType::PatternUpdated,
                Some(old_slug),
                Some(pattern.slug.clone()),
            );

            Ok(())
        })
    }

    fn delete(&mut self, id: i64) -> Result<()> {
        self.mutate("delete_pattern", |tx, ctx| {
            let slug = ensure_pattern(tx, id)?;

            // Term links and metadata go with the row via ON DELETE CASCADE
            tx.execute("DELETE FROM patterns WHERE id = ?1", [id])?;

            ctx.record_change(
                "pattern",
                &id.to_string(),
                EventType::PatternDeleted,
                Some(slug),
                None,
            );

            Ok(())
        })
    }

    fn get_terms(&self, id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name FROM pattern_terms pt
             JOIN terms t ON t.id = pt.term_id
             WHERE pt.pattern_id = ?1 AND t.taxonomy = ?2
             ORDER BY pt.position ASC",
        )?;
        let names = stmt
            .query_map(rusqlite::params![id, PATTERN_CATEGORY_TAXONOMY], |row| {
                row.get(0)
            })?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn find_term(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM terms WHERE taxonomy = ?1 AND name = ?2",
                rusqlite::params![PATTERN_CATEGORY_TAXONOMY, name],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn create_term(&mut self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "category name cannot be empty".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("create_term", |tx, ctx| {
            tx.execute(
                "INSERT INTO terms (taxonomy, name, slug, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![PATTERN_CATEGORY_TAXONOMY, name, slugify(name), now],
            )?;
            let id = tx.last_insert_rowid();

            ctx.record_change(
                "term",
                &id.to_string(),
                EventType::TermCreated,
                None,
                Some(name.to_string()),
            );

            Ok(id)
        })
    }

    fn assign_terms(&mut self, id: i64, term_ids: &[i64]) -> Result<()> {
        self.mutate("assign_terms", |tx, ctx| {
            ensure_pattern(tx, id)?;

            tx.execute(
                "DELETE FROM pattern_terms
                 WHERE pattern_id = ?1
                   AND term_id IN (SELECT id FROM terms WHERE taxonomy = ?2)",
                rusqlite::params![id, PATTERN_CATEGORY_TAXONOMY],
            )?;

            for (position, term_id) in term_ids.iter().enumerate() {
                tx.execute(
                    "INSERT OR IGNORE INTO pattern_terms (pattern_id, term_id, position)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![id, term_id, i64::try_from(position).unwrap_or(i64::MAX)],
                )?;
            }

            let joined = term_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            ctx.record_change(
                "pattern",
                &id.to_string(),
                EventType::TermsAssigned,
                None,
                Some(joined),
            );

            Ok(())
        })
    }

    fn get_meta(&self, id: i64, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT meta_value FROM pattern_meta WHERE pattern_id = ?1 AND meta_key = ?2",
                rusqlite::params![id, key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_meta(&mut self, id: i64, key: &str, value: &str) -> Result<()> {
        self.mutate("set_meta", |tx, ctx| {
            ensure_pattern(tx, id)?;

            let old: Option<String> = tx
                .query_row(
                    "SELECT meta_value FROM pattern_meta WHERE pattern_id = ?1 AND meta_key = ?2",
                    rusqlite::params![id, key],
                    |row| row.get(0),
                )
                .optional()?;

            tx.execute(
                "INSERT INTO pattern_meta (pattern_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(pattern_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
                rusqlite::params![id, key, value],
            )?;

            ctx.record_change(
                "pattern",
                &id.to_string(),
                EventType::MetaSet,
                old,
                Some(format!("{key}={value}")),
            );

            Ok(())
        })
    }

    fn delete_meta(&mut self, id: i64, key: &str) -> Result<()> {
        self.mutate("delete_meta", |tx, ctx| {
            let rows = tx.execute(
                "DELETE FROM pattern_meta WHERE pattern_id = ?1 AND meta_key = ?2",
                rusqlite::params![id, key],
            )?;

            if rows > 0 {
                ctx.record_change(
                    "pattern",
                    &id.to_string(),
                    EventType::MetaDeleted,
                    Some(key.to_string()),
                    None,
                );
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SYNC_STATUS_META_KEY;
    use tempfile::TempDir;

    fn hero() -> NewPattern {
        NewPattern::published("hero-banner", "Hero Banner", "<div/>")
    }

    #[test]
    fn test_open_file_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("patterns.db");

        let mut storage = SqliteStorage::open(&db_path).unwrap();
        storage.create(&hero()).unwrap();
        drop(storage);

        let reopened = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(reopened.count_patterns().unwrap(), 1);
    }

    #[test]
    fn test_create_and_find_by_slug() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let id = storage.create(&hero()).unwrap();

        let found = storage.find_by_slug("hero-banner").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.title, "Hero Banner");
        assert_eq!(found.status, PostStatus::Publish);
        assert!(storage.find_by_slug("missing").unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_duplicate_slug() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create(&hero()).unwrap();

        let err = storage.create(&hero()).unwrap_err();
        assert!(matches!(err, Error::SlugExists { .. }));
        assert_eq!(storage.count_patterns().unwrap(), 1);
    }

    #[test]
    fn test_query_published_orders_by_slug_and_skips_drafts() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .create(&NewPattern::published("zeta", "Zeta", "z"))
            .unwrap();
        storage
            .create(&NewPattern::published("alpha", "Alpha", "a"))
            .unwrap();
        storage
            .create(&NewPattern::published("middle", "Middle", "m").with_status(PostStatus::Draft))
            .unwrap();

        let slugs: Vec<_> = storage
            .query_published()
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["alpha", "zeta"]);

        assert_eq!(storage.list_patterns(true).unwrap().len(), 3);
        assert_eq!(storage.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_update_in_place() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let id = storage.create(&hero()).unwrap();

        storage
            .update(id, &NewPattern::published("hero-banner", "Hero", "<p/>"))
            .unwrap();

        let p = storage.get_pattern(id).unwrap().unwrap();
        assert_eq!(p.title, "Hero");
        assert_eq!(p.content, "<p/>");

        let err = storage.update(999, &hero()).unwrap_err();
        assert!(matches!(err, Error::PatternIdNotFound { id: 999 }));
    }

    #[test]
    fn test_delete_cascades_terms_and_meta() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let id = storage.create(&hero()).unwrap();
        let term = storage.find_or_create_term("Headers").unwrap();
        storage.assign_terms(id, &[term]).unwrap();
        storage.set_meta(id, SYNC_STATUS_META_KEY, "unsynced").unwrap();

        storage.delete(id).unwrap();

        assert!(storage.get_pattern(id).unwrap().is_none());
        let links: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM pattern_terms", [], |row| row.get(0))
            .unwrap();
        let meta: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM pattern_meta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 0);
        assert_eq!(meta, 0);
        // The term itself outlives the pattern
        assert!(storage.find_term("Headers").unwrap().is_some());
    }

    #[test]
    fn test_find_or_create_term_is_stable() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let first = storage.find_or_create_term("Headers").unwrap();
        let second = storage.find_or_create_term("Headers").unwrap();
        assert_eq!(first, second);
        assert!(storage.find_term("headers").unwrap().is_none());
    }

    #[test]
    fn test_assign_terms_replaces_previous_set() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let id = storage.create(&hero()).unwrap();
        let headers = storage.find_or_create_term("Headers").unwrap();
        let footers = storage.find_or_create_term("Footers").unwrap();
        let cta = storage.find_or_create_term("CTA").unwrap();

        storage.assign_terms(id, &[headers, footers]).unwrap();
        assert_eq!(storage.get_terms(id).unwrap(), vec!["Headers", "Footers"]);

        storage.assign_terms(id, &[cta, headers, cta]).unwrap();
        assert_eq!(storage.get_terms(id).unwrap(), vec!["CTA", "Headers"]);
    }

    #[test]
    fn test_meta_set_get_delete() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let id = storage.create(&hero()).unwrap();

        assert!(storage.get_meta(id, SYNC_STATUS_META_KEY).unwrap().is_none());
        storage.set_meta(id, SYNC_STATUS_META_KEY, "unsynced").unwrap();
        storage.set_meta(id, SYNC_STATUS_META_KEY, "unsynced").unwrap();
        assert_eq!(
            storage.get_meta(id, SYNC_STATUS_META_KEY).unwrap().as_deref(),
            Some("unsynced")
        );

        storage.delete_meta(id, SYNC_STATUS_META_KEY).unwrap();
        assert!(storage.get_meta(id, SYNC_STATUS_META_KEY).unwrap().is_none());
        // Clearing an absent entry is a no-op
        storage.delete_meta(id, SYNC_STATUS_META_KEY).unwrap();
    }

    #[test]
    fn test_mutations_write_audit_events() {
        let mut storage = SqliteStorage::open_memory().unwrap().with_actor("tester");
        let id = storage.create(&hero()).unwrap();
        storage.delete(id).unwrap();

        let events = storage.recent_events(10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::PatternDeleted);
        assert_eq!(events[0].old_value.as_deref(), Some("hero-banner"));
        assert_eq!(events[1].event_type, EventType::PatternCreated);
        assert!(events.iter().all(|e| e.actor == "tester"));
    }
}
