//! Library snapshots
//!
//! Persistence belongs to the host application. Analytics only need a
//! read-only snapshot of its records, supplied through `SnapshotStore`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use shelf_common::models::{BookNote, ProgressLogEntry, ReadingDay, StreakFreeze, TrackedBook};
use shelf_common::time::local_day;
use shelf_common::{Error, Result};
use tracing::{debug, warn};

/// Everything the analytics read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    #[serde(default)]
    pub books: Vec<TrackedBook>,
    #[serde(default)]
    pub progress: Vec<ProgressLogEntry>,
    #[serde(default)]
    pub reading_days: Vec<ReadingDay>,
    #[serde(default)]
    pub freezes: Vec<StreakFreeze>,
    #[serde(default)]
    pub notes: Vec<BookNote>,
}

impl LibrarySnapshot {
    /// Local days with a progress entry or a read marker
    pub fn activity_days<Tz: TimeZone>(&self, tz: &Tz) -> BTreeSet<NaiveDate> {
        self.progress
            .iter()
            .map(|entry| local_day(&entry.logged_at, tz))
            .chain(self.reading_days.iter().map(|marker| marker.day))
            .collect()
    }

    pub fn frozen_days(&self) -> BTreeSet<NaiveDate> {
        self.freezes.iter().map(|freeze| freeze.day).collect()
    }

    /// Drop progress entries carrying neither a page nor a percentage
    ///
    /// Snapshots written by other tools bypass the entry constructors.
    fn discard_empty_entries(&mut self) {
        let before = self.progress.len();
        self.progress
            .retain(|entry| entry.page.is_some() || entry.percentage.is_some());
        let dropped = before - self.progress.len();
        if dropped > 0 {
            warn!("Ignoring {} progress entries with no page or percentage", dropped);
        }
    }
}

/// Source of library snapshots
pub trait SnapshotStore {
    fn load(&self) -> Result<LibrarySnapshot>;
}

/// Snapshot exported as a single JSON document
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a snapshot, creating parent directories as needed
    pub fn save(&self, snapshot: &LibrarySnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> Result<LibrarySnapshot> {
        if !self.path.exists() {
            return Err(Error::NotFound(format!(
                "Snapshot file not found: {}",
                self.path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut snapshot: LibrarySnapshot = serde_json::from_str(&content)?;
        snapshot.discard_empty_entries();

        debug!(
            "Loaded snapshot from {}: {} books, {} progress entries",
            self.path.display(),
            snapshot.books.len(),
            snapshot.progress.len()
        );

        Ok(snapshot)
    }
}
