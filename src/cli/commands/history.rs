//! Audit history command implementation.

use crate::cli::commands::open_storage;
use crate::error::Result;
use crate::storage::events::Event;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct HistoryItem {
    id: i64,
    at: String,
    actor: String,
    event: String,
    entity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_value: Option<String>,
}

impl From<Event> for HistoryItem {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            at: format_millis(event.created_at),
            actor: event.actor,
            event: event.event_type.to_string(),
            entity: format!("{}:{}", event.entity_type, event.entity_id),
            old_value: event.old_value,
            new_value: event.new_value,
        }
    }
}

fn format_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map_or_else(|| ms.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Print the most recent store mutations, newest first.
///
/// # Errors
///
/// Returns an error if the database is missing or cannot be read.
pub fn execute(limit: u32, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path, None)?;
    let items: Vec<HistoryItem> = storage
        .recent_events(limit)?
        .into_iter()
        .map(HistoryItem::from)
        .collect();

    if json {
        println!("{}", serde_json::to_string(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    for item in &items {
        let change = match (&item.old_value, &item.new_value) {
            (Some(old), Some(new)) => format!("{old} -> {new}"),
            (Some(old), None) => old.clone(),
            (None, Some(new)) => new.clone(),
            (None, None) => String::new(),
        };
        println!(
            "{}  {:<16} {:<14} {:<12} {change}",
            item.at, item.event, item.entity, item.actor
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::events::EventType;

    #[test]
    fn test_history_item_from_event() {
        let mut event = Event::new("pattern", "7", EventType::PatternDeleted, "ci")
            .with_values(Some("old-cta".to_string()), None);
        event.created_at = 0;

        let item = HistoryItem::from(event);
        assert_eq!(item.at, "1970-01-01 00:00:00");
        assert_eq!(item.entity, "pattern:7");
        assert_eq!(item.event, "pattern_deleted");
        assert_eq!(item.old_value.as_deref(), Some("old-cta"));
    }
}
