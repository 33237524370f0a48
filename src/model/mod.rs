//! Data models.
//!
//! This module contains the domain models shared by the store and sync layers:
//! - Pattern (plus its publication and sync statuses)
//! - NewPattern (the field set used to create one)

pub mod pattern;

pub use pattern::{
    NewPattern, Pattern, PostStatus, SyncStatus, PATTERN_CATEGORY_TAXONOMY, PATTERN_POST_TYPE,
    SYNC_STATUS_META_KEY,
};
