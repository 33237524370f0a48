//! Configuration management.
//!
//! This module resolves the three locations every command needs:
//! - **Database**: a single global store at `~/.psync/data/patterns.db`
//! - **Patterns directory**: per-project `patterns/blocks-sync/` under the
//!   git root (or the current directory outside a repository)
//! - **Slug prefix**: the namespace written in front of exported slugs,
//!   derived from the project directory name
//!
//! Each can be overridden by a CLI flag or a `PSYNC_*` environment variable.

use crate::error::{Error, Result};
use crate::sync::slugify;

use std::path::{Path, PathBuf};

/// Patterns directory relative to the project root.
pub const DEFAULT_PATTERNS_SUBDIR: &str = "patterns/blocks-sync";

/// Read a non-blank environment variable.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get the global psync directory location (`~/.psync/`).
#[must_use]
pub fn global_psync_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".psync"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `PSYNC_DB` environment variable
/// 3. Global location: `~/.psync/data/patterns.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no home directory
/// can be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(db_path) = env_non_empty("PSYNC_DB") {
        return Some(PathBuf::from(db_path));
    }

    global_psync_dir().map(|dir| dir.join("data").join("patterns.db"))
}

/// Get the git repository root directory.
fn git_toplevel() -> Option<PathBuf> {
    std::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| PathBuf::from(String::from_utf8_lossy(&o.stdout).trim().to_string()))
        .filter(|p| !p.as_os_str().is_empty())
}

/// The project root: the git toplevel, or the current directory.
///
/// # Errors
///
/// Returns `Error::Config` if neither can be determined.
pub fn project_root() -> Result<PathBuf> {
    if let Some(root) = git_toplevel() {
        return Ok(root);
    }
    std::env::current_dir()
        .map_err(|e| Error::Config(format!("Failed to get current directory: {e}")))
}

/// Default patterns directory for a given project root.
#[must_use]
pub fn patterns_dir_for_root(root: &Path) -> PathBuf {
    root.join(DEFAULT_PATTERNS_SUBDIR)
}

/// Default slug prefix for a given project root: its slugified directory name.
#[must_use]
pub fn prefix_for_root(root: &Path) -> String {
    root.file_name()
        .map(|name| slugify(&name.to_string_lossy()))
        .unwrap_or_default()
}

/// Resolve the patterns directory.
///
/// Priority: `explicit`, then `PSYNC_PATTERNS_DIR`, then
/// `<project root>/patterns/blocks-sync`.
///
/// # Errors
///
/// Returns an error if the project root is needed and cannot be determined.
pub fn resolve_patterns_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_non_empty("PSYNC_PATTERNS_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(patterns_dir_for_root(&project_root()?))
}

/// Resolve the export slug prefix.
///
/// Priority: `explicit` (an empty string disables the prefix), then
/// `PSYNC_PREFIX`, then the slugified project directory name.
///
/// # Errors
///
/// Returns an error if the project root is needed and cannot be determined.
pub fn resolve_prefix(explicit: Option<&str>) -> Result<String> {
    if let Some(prefix) = explicit {
        return Ok(prefix.trim_matches('/').to_string());
    }
    if let Some(prefix) = env_non_empty("PSYNC_PREFIX") {
        return Ok(prefix.trim_matches('/').to_string());
    }
    Ok(prefix_for_root(&project_root()?))
}

/// Get the default actor name.
///
/// Priority:
/// 1. `PSYNC_ACTOR` environment variable
/// 2. Git user name
/// 3. System username
/// 4. "unknown"
#[must_use]
pub fn default_actor() -> String {
    if let Some(actor) = env_non_empty("PSYNC_ACTOR") {
        return actor;
    }

    if let Ok(output) = std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
    {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    if let Some(user) = env_non_empty("USER") {
        return user;
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_actor() {
        let actor = default_actor();
        assert!(!actor.is_empty());
    }

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/patterns.db");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_global_psync_dir_is_under_home() {
        let dir = global_psync_dir().unwrap();
        assert!(dir.ends_with(".psync"));
    }

    #[test]
    fn test_patterns_dir_for_root() {
        let dir = patterns_dir_for_root(Path::new("/work/my-theme"));
        assert_eq!(dir, PathBuf::from("/work/my-theme/patterns/blocks-sync"));
    }

    #[test]
    fn test_prefix_for_root_is_slugified() {
        assert_eq!(prefix_for_root(Path::new("/work/My Theme")), "my-theme");
        assert_eq!(prefix_for_root(Path::new("/")), "");
    }

    #[test]
    fn test_explicit_values_win() {
        assert_eq!(
            resolve_patterns_dir(Some(Path::new("/tmp/blocks"))).unwrap(),
            PathBuf::from("/tmp/blocks")
        );
        assert_eq!(resolve_prefix(Some("mytheme/")).unwrap(), "mytheme");
        assert_eq!(resolve_prefix(Some("")).unwrap(), "");
    }
}
