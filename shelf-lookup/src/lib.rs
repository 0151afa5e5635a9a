//! shelf-lookup library interface
//!
//! Book metadata resolution across two catalog sources:
//! - `services::google_books_client` (primary)
//! - `services::open_library_client` (secondary / fallback)
//! - `services::resolver` merges, deduplicates and ranks their results
//! - `services::cover_cache` keeps fetched cover images

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use crate::error::{LookupError, SourceError};
pub use crate::services::resolver::Resolver;
pub use crate::types::{CandidateBook, CatalogSource, CatalogSourceKind, ScoredCandidate};
