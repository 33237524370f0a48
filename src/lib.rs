//! psync - block pattern sync between a content store and JSON files
//!
//! This crate provides the core functionality for the `psync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Pattern, sync and publication statuses)
//! - [`storage`] - Content store trait and its SQLite implementation
//! - [`sync`] - Pattern export, import reconciliation and slugs
//! - [`config`] - Path, prefix and actor resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
