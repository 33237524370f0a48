//! Error types for the patterns sync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers
//!
//! Only command-level failures travel through this type. Per-file problems
//! during a sync run are reported as warnings and never reach the exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    PatternNotFound,

    // Validation (exit 4)
    SlugExists,
    InvalidArgument,

    // Sync (exit 6)
    DirectoryNotFound,
    DirectoryCreateFailed,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::PatternNotFound => "PATTERN_NOT_FOUND",
            Self::SlugExists => "SLUG_EXISTS",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DirectoryNotFound => "DIRECTORY_NOT_FOUND",
            Self::DirectoryCreateFailed => "DIRECTORY_CREATE_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::PatternNotFound => 3,
            Self::SlugExists | Self::InvalidArgument => 4,
            Self::DirectoryNotFound | Self::DirectoryCreateFailed => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying with corrected input can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SlugExists
                | Self::InvalidArgument
                | Self::DirectoryNotFound
                | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in patterns sync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `psync init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Cannot create patterns directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pattern not found: {slug}")]
    PatternNotFound { slug: String },

    #[error("Pattern not found: #{id}")]
    PatternIdNotFound { id: i64 },

    #[error("A pattern with slug '{slug}' already exists")]
    SlugExists { slug: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::DirectoryNotFound { .. } => ErrorCode::DirectoryNotFound,
            Self::CreateDirectory { .. } => ErrorCode::DirectoryCreateFailed,
            Self::PatternNotFound { .. } | Self::PatternIdNotFound { .. } => {
                ErrorCode::PatternNotFound
            }
            Self::SlugExists { .. } => ErrorCode::SlugExists,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `psync init` to create the pattern database".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::DirectoryNotFound { path } => Some(format!(
                "Run `psync export --dir {}` first, or pass --dir pointing at an existing directory.",
                path.display()
            )),

            Self::PatternNotFound { slug } => Some(format!(
                "No pattern with slug '{slug}'. Use `psync pattern list --all` to see stored patterns."
            )),

            Self::SlugExists { slug } => Some(format!(
                "Pick another --slug, or remove the existing one with `psync pattern rm {slug}`."
            )),

            Self::CreateDirectory { .. }
            | Self::PatternIdNotFound { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
