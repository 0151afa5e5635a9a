//! shelf-stats library interface
//!
//! Reading analytics derived from a library snapshot. Every calculator is a
//! pure function of its inputs; `engine::AnalyticsEngine` runs them all over
//! one snapshot and never modifies it.

pub mod challenge;
pub mod engine;
pub mod goals;
pub mod pace;
pub mod snapshot;
pub mod streak;
pub mod summary;

pub use crate::engine::{AnalyticsEngine, AnalyticsSettings, DerivedAnalytics, ReminderFacts};
pub use crate::snapshot::{JsonSnapshotStore, LibrarySnapshot, SnapshotStore};
