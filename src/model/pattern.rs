//! Pattern model.
//!
//! A pattern is a reusable block of markup stored by the content store and
//! identified by a unique slug. Its sync status is not a column of its own:
//! it lives in the pattern's metadata bag under [`SYNC_STATUS_META_KEY`].

use serde::{Deserialize, Serialize};

/// Content type of block patterns in the store.
pub const PATTERN_POST_TYPE: &str = "wp_block";

/// Taxonomy that holds pattern categories.
pub const PATTERN_CATEGORY_TAXONOMY: &str = "wp_pattern_category";

/// Metadata key used to persist a non-default sync status.
pub const SYNC_STATUS_META_KEY: &str = "wp_pattern_sync_status";

/// Publication status of a stored pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
}

impl PostStatus {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
        }
    }

    /// Parse from storage. Unknown values are treated as drafts so they
    /// never leak into an export.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s {
            "publish" => Self::Publish,
            _ => Self::Draft,
        }
    }
}

/// Logical sync status of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Synced,
    Unsynced,
}

impl SyncStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Unsynced => "unsynced",
        }
    }

    /// Resolve the logical status from a raw value (metadata entry or
    /// record field). Only the exact string `unsynced` detaches a pattern;
    /// anything else, including absence, means `synced`.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("unsynced") => Self::Unsynced,
            _ => Self::Synced,
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pattern as stored by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Store-assigned identity
    pub id: i64,

    /// Unique slug within the pattern content type
    pub slug: String,

    /// Display title
    pub title: String,

    /// Block markup
    pub content: String,

    /// Publication status
    pub status: PostStatus,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

/// Field set used to create a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPattern {
    pub status: PostStatus,
    pub slug: String,
    pub title: String,
    pub content: String,
}

impl NewPattern {
    /// A published pattern.
    #[must_use]
    pub fn published(slug: &str, title: &str, content: &str) -> Self {
        Self {
            status: PostStatus::Publish,
            slug: slug.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    /// Set the publication status.
    #[must_use]
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }
}
