//! File operations for pattern sync.
//!
//! This module owns everything that touches the patterns directory:
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Directory scans for `*.json` records
//! - Lenient record parsing and record encoding

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::sync::types::{IncomingRecord, PatternRecord, SyncError, SyncResult};

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file (same path with `.json.tmp` extension)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> SyncResult<()> {
    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// List the `*.json` files directly inside `dir`, sorted by file name.
///
/// Subdirectories and files with any other extension are ignored.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_json_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read and leniently parse one record file.
///
/// # Errors
///
/// Returns `SyncError::Io` if the file cannot be read, or a parse error from
/// [`parse_record`].
pub fn read_record(path: &Path) -> SyncResult<IncomingRecord> {
    let text = fs::read_to_string(path)?;
    parse_record(&text)
}

/// Parse a record, tolerating wrong-typed optional fields.
///
/// Only malformed JSON or a non-object document is an error here; missing
/// fields are left for the importer to judge.
///
/// # Errors
///
/// Returns `SyncError::Json` for invalid JSON and `SyncError::NotAnObject`
/// when the top-level value is not an object.
pub fn parse_record(text: &str) -> SyncResult<IncomingRecord> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = value else {
        return Err(SyncError::NotAnObject);
    };

    Ok(IncomingRecord {
        title: string_field(&map, "title"),
        slug: map.get("slug").and_then(scalar_string),
        content: map.get("content").and_then(truthy_string),
        categories: categories_field(&map),
        sync_status: string_field(&map, "syncStatus"),
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Stringify a scalar the way a loosely typed caller would expect.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A scalar that is not falsy (`null`, `false`, `0`, `""`, `"0"`).
fn truthy_string(value: &Value) -> Option<String> {
    if value.as_f64() == Some(0.0) {
        return None;
    }
    scalar_string(value).filter(|s| !s.is_empty() && s != "0")
}

fn categories_field(map: &Map<String, Value>) -> Vec<String> {
    match map.get("categories") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_string).collect(),
        _ => Vec::new(),
    }
}

/// Serialize a record for writing.
///
/// Forward slashes and non-ASCII text are written as-is. Pretty output uses
/// four-space indentation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_record(record: &PatternRecord, pretty: bool) -> SyncResult<String> {
    if !pretty {
        return Ok(serde_json::to_string(record)?);
    }

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;

    String::from_utf8(buf).map_err(|e| SyncError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
