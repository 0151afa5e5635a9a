//! # Shelf Common Library
//!
//! Shared code for the Shelf crates including:
//! - Error type and result alias
//! - TOML configuration and root folder resolution
//! - Tracing subscriber setup for the binaries
//! - Catalog identifier (ISBN) normalization
//! - Persisted record models (tracked books, progress log, read markers)
//! - Local-day time helpers

pub mod config;
pub mod error;
pub mod isbn;
pub mod logging;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use isbn::normalize_identifier;
