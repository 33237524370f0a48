//! Content store layer.
//!
//! The sync engine never talks to a database directly. It goes through
//! [`ContentStore`], the small capability surface a host content system has
//! to offer: pattern CRUD, category terms, and a metadata bag. The bundled
//! implementation is [`SqliteStorage`].
//!
//! # Submodules
//!
//! - [`events`] - Audit event storage
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - SQLite-backed content store

pub mod events;
pub mod schema;
pub mod sqlite;

pub use sqlite::{MutationContext, SqliteStorage};

use crate::error::Result;
use crate::model::{NewPattern, Pattern};

/// Persistence operations the sync engine needs from a host content system.
///
/// Term and taxonomy methods always operate on the pattern category
/// taxonomy; metadata methods operate on a single pattern's key/value bag.
pub trait ContentStore {
    /// All published patterns, ordered by slug ascending.
    fn query_published(&self) -> Result<Vec<Pattern>>;

    /// `(id, slug)` of every stored pattern regardless of status.
    fn list_all(&self) -> Result<Vec<(i64, String)>>;

    /// Look a pattern up by its unique slug.
    fn find_by_slug(&self, slug: &str) -> Result<Option<Pattern>>;

    /// Create a pattern and return its store-assigned id.
    fn create(&mut self, pattern: &NewPattern) -> Result<i64>;

    /// Overwrite a pattern's fields in place.
    fn update(&mut self, id: i64, pattern: &NewPattern) -> Result<()>;

    /// Permanently delete a pattern with its term links and metadata.
    fn delete(&mut self, id: i64) -> Result<()>;

    /// Category names assigned to a pattern, in assignment order.
    fn get_terms(&self, id: i64) -> Result<Vec<String>>;

    /// Find a category term by exact name.
    fn find_term(&self, name: &str) -> Result<Option<i64>>;

    /// Create a category term and return its id.
    fn create_term(&mut self, name: &str) -> Result<i64>;

    /// Resolve a category name to a term, creating it when absent.
    fn find_or_create_term(&mut self, name: &str) -> Result<i64> {
        match self.find_term(name)? {
            Some(id) => Ok(id),
            None => self.create_term(name),
        }
    }

    /// Replace every category assignment of a pattern with `term_ids`.
    fn assign_terms(&mut self, id: i64, term_ids: &[i64]) -> Result<()>;

    fn get_meta(&self, id: i64, key: &str) -> Result<Option<String>>;

    fn set_meta(&mut self, id: i64, key: &str, value: &str) -> Result<()>;

    fn delete_meta(&mut self, id: i64, key: &str) -> Result<()>;
}
