//! Audit event storage and retrieval.
//!
//! Every store mutation leaves an event row, so an import run can be
//! reconstructed after the fact.

use rusqlite::{Connection, Result};

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    // Pattern events
    PatternCreated,
    PatternUpdated,
    PatternDeleted,

    // Taxonomy events
    TermCreated,
    TermsAssigned,

    // Metadata events
    MetaSet,
    MetaDeleted,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PatternCreated => "pattern_created",
            Self::PatternUpdated => "pattern_updated",
            Self::PatternDeleted => "pattern_deleted",
            Self::TermCreated => "term_created",
            Self::TermsAssigned => "terms_assigned",
            Self::MetaSet => "meta_set",
            Self::MetaDeleted => "meta_deleted",
        }
    }

    /// Parse a stored event type.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pattern_created" => Some(Self::PatternCreated),
            "pattern_updated" => Some(Self::PatternUpdated),
            "pattern_deleted" => Some(Self::PatternDeleted),
            "term_created" => Some(Self::TermCreated),
            "terms_assigned" => Some(Self::TermsAssigned),
            "meta_set" => Some(Self::MetaSet),
            "meta_deleted" => Some(Self::MetaDeleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit event record.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub actor: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by database).
    #[must_use]
    pub fn new(entity_type: &str, entity_id: &str, event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event_type,
            actor: actor.to_string(),
            old_value: None,
            new_value: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add old/new values for field change tracking.
    #[must_use]
    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, old_value, new_value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            event.entity_type,
            event.entity_id,
            event.event_type.as_str(),
            event.actor,
            event.old_value,
            event.new_value,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get the most recent events, newest first.
///
/// Rows with an event type this build does not know are skipped.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn recent_events(conn: &Connection, limit: u32) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, entity_type, entity_id, event_type, actor, old_value, new_value, created_at
         FROM events
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit], |row| {
        let Some(event_type) = EventType::parse(row.get::<_, String>(3)?.as_str()) else {
            return Ok(None);
        };
        Ok(Some(Event {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            event_type,
            actor: row.get(4)?,
            old_value: row.get(5)?,
            new_value: row.get(6)?,
            created_at: row.get(7)?,
        }))
    })?;

    let mut events = Vec::new();
    for row in rows {
        if let Some(event) = row? {
            events.push(event);
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    #[test]
    fn test_event_insert_and_recent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let event = Event::new("pattern", "1", EventType::PatternCreated, "test-actor")
            .with_values(None, Some("hero-banner".to_string()));
        let id = insert_event(&conn, &event).unwrap();
        assert!(id > 0);

        insert_event(
            &conn,
            &Event::new("pattern", "1", EventType::MetaSet, "test-actor"),
        )
        .unwrap();

        let events = recent_events(&conn, 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::MetaSet);
        assert_eq!(events[1].new_value.as_deref(), Some("hero-banner"));
    }

    #[test]
    fn test_event_type_parse_round_trips_names() {
        for ty in [
            EventType::PatternCreated,
            EventType::PatternUpdated,
            EventType::PatternDeleted,
            EventType::TermCreated,
            EventType::TermsAssigned,
            EventType::MetaSet,
            EventType::MetaDeleted,
        ] {
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EventType::parse("post_trashed"), None);
    }
}
