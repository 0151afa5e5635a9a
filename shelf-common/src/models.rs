//! Persisted record models
//!
//! These are the records the persistence layer owns. The lookup and stats
//! crates only read them (and build new ones from accepted candidates);
//! nothing here talks to storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Reading status of a tracked book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ReadStatus {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ReadStatus::NotStarted => "Not started",
            ReadStatus::InProgress => "Reading",
            ReadStatus::Completed => "Finished",
        }
    }
}

/// Progress through a book, either as a page or a fraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReadingProgress {
    /// Current page (1-based)
    Page(u32),
    /// Fraction read, 0.0-1.0
    Percent(f64),
}

impl ReadingProgress {
    /// Resolve to a page number when possible
    ///
    /// A `Percent` needs the book's page count to become a page.
    pub fn as_page(&self, page_count: Option<u32>) -> Option<u32> {
        match *self {
            ReadingProgress::Page(page) => Some(page),
            ReadingProgress::Percent(fraction) => {
                page_count.map(|total| percent_to_page(fraction, total))
            }
        }
    }
}

fn percent_to_page(fraction: f64, total: u32) -> u32 {
    (fraction.clamp(0.0, 1.0) * f64::from(total)).round() as u32
}

/// A book in the user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedBook {
    pub id: Uuid,
    /// Normalized catalog identifier (ISBN-13 preferred)
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    pub status: ReadStatus,
    /// 1-5 stars; only meaningful once completed
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub started_on: Option<NaiveDate>,
    #[serde(default)]
    pub finished_on: Option<NaiveDate>,
    #[serde(default)]
    pub progress: Option<ReadingProgress>,
    pub added_at: DateTime<Utc>,
}

impl TrackedBook {
    /// New not-started book
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: identifier.into(),
            title: title.into(),
            authors: Vec::new(),
            page_count: None,
            status: ReadStatus::NotStarted,
            rating: None,
            started_on: None,
            finished_on: None,
            progress: None,
            added_at: Utc::now(),
        }
    }

    /// Rating, only when the book is completed
    pub fn effective_rating(&self) -> Option<u8> {
        match self.status {
            ReadStatus::Completed => self.rating,
            ReadStatus::NotStarted | ReadStatus::InProgress => None,
        }
    }

    /// Progress, only when the book has been started
    pub fn effective_progress(&self) -> Option<ReadingProgress> {
        match self.status {
            ReadStatus::InProgress | ReadStatus::Completed => self.progress,
            ReadStatus::NotStarted => None,
        }
    }

    /// Current page, resolving percentage progress through the page count
    pub fn current_page(&self) -> Option<u32> {
        self.effective_progress()?.as_page(self.page_count)
    }

    /// Set a 1-5 rating
    pub fn set_rating(&mut self, rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::InvalidInput(format!(
                "rating must be 1-5, got {}",
                rating
            )));
        }
        self.rating = Some(rating);
        Ok(())
    }

    /// Move to a new status, applying the side effects of the transition
    ///
    /// `on` is the local day the transition happens.
    pub fn transition_to(mut self, status: ReadStatus, on: NaiveDate) -> Self {
        match status {
            ReadStatus::NotStarted => {
                self.started_on = None;
                self.finished_on = None;
                self.progress = None;
                self.rating = None;
            }
            ReadStatus::InProgress => {
                self.started_on.get_or_insert(on);
                self.finished_on = None;
                self.rating = None;
                if self.progress.is_none() {
                    self.progress = Some(ReadingProgress::Page(0));
                }
            }
            ReadStatus::Completed => {
                self.started_on.get_or_insert(on);
                self.finished_on = Some(on);
                self.progress = match self.page_count {
                    Some(total) => Some(ReadingProgress::Page(total)),
                    None => Some(ReadingProgress::Percent(1.0)),
                };
            }
        }
        self.status = status;
        self
    }
}

/// One progress update for a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLogEntry {
    pub book_id: Uuid,
    #[serde(default)]
    pub page: Option<u32>,
    /// Fraction read, 0.0-1.0
    #[serde(default)]
    pub percentage: Option<f64>,
    pub logged_at: DateTime<Utc>,
}

impl ProgressLogEntry {
    /// Entry with at least one of page/percentage
    pub fn new(
        book_id: Uuid,
        page: Option<u32>,
        percentage: Option<f64>,
        logged_at: DateTime<Utc>,
    ) -> Result<Self> {
        if page.is_none() && percentage.is_none() {
            return Err(Error::InvalidInput(
                "progress entry needs a page or a percentage".to_string(),
            ));
        }
        if let Some(p) = percentage {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidInput(format!(
                    "percentage must be within 0.0-1.0, got {}",
                    p
                )));
            }
        }
        Ok(Self {
            book_id,
            page,
            percentage,
            logged_at,
        })
    }

    pub fn at_page(book_id: Uuid, page: u32, logged_at: DateTime<Utc>) -> Self {
        Self {
            book_id,
            page: Some(page),
            percentage: None,
            logged_at,
        }
    }

    pub fn at_percentage(book_id: Uuid, percentage: f64, logged_at: DateTime<Utc>) -> Self {
        Self {
            book_id,
            page: None,
            percentage: Some(percentage.clamp(0.0, 1.0)),
            logged_at,
        }
    }

    /// Page for this entry: explicit page wins, else percentage of the page count
    pub fn resolved_page(&self, page_count: Option<u32>) -> Option<u32> {
        self.page.or_else(|| {
            let fraction = self.percentage?;
            page_count.map(|total| percent_to_page(fraction, total))
        })
    }
}

/// A day the user marked as read without logging a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingDay {
    pub day: NaiveDate,
}

/// A day covered by a streak freeze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakFreeze {
    pub day: NaiveDate,
}

/// Kind of note attached to a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteKind {
    /// Verbatim passage, optionally pinned to a page
    Quote { page: Option<u32> },
    /// Free-form reader's note
    Thought,
}

/// A quote or note logged against a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookNote {
    pub book_id: Uuid,
    pub kind: NoteKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ReadStatus::NotStarted.label(), "Not started");
        assert_eq!(ReadStatus::InProgress.label(), "Reading");
        assert_eq!(ReadStatus::Completed.label(), "Finished");
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book_with_pages(pages: u32) -> TrackedBook {
        let mut book = TrackedBook::new("9780062316110", "Sapiens");
        book.page_count = Some(pages);
        book
    }

    #[test]
    fn test_rating_hidden_until_completed() {
        let mut book = book_with_pages(300).transition_to(ReadStatus::InProgress, day(2024, 3, 1));
        book.rating = Some(4);
        assert_eq!(book.effective_rating(), None);

        let mut book = book.transition_to(ReadStatus::Completed, day(2024, 3, 20));
        book.set_rating(4).unwrap();
        assert_eq!(book.effective_rating(), Some(4));
    }

    #[test]
    fn test_set_rating_out_of_range() {
        let mut book = book_with_pages(100);
        assert!(book.set_rating(0).is_err());
        assert!(book.set_rating(6).is_err());
        assert_eq!(book.rating, None);
    }

    #[test]
    fn test_transition_in_progress_sets_start_once() {
        let book = book_with_pages(300).transition_to(ReadStatus::InProgress, day(2024, 3, 1));
        assert_eq!(book.started_on, Some(day(2024, 3, 1)));
        assert_eq!(book.current_page(), Some(0));

        let book = book.transition_to(ReadStatus::InProgress, day(2024, 3, 5));
        assert_eq!(book.started_on, Some(day(2024, 3, 1)));
    }

    #[test]
    fn test_transition_completed_fills_progress() {
        let book = book_with_pages(328).transition_to(ReadStatus::Completed, day(2024, 5, 2));
        assert_eq!(book.finished_on, Some(day(2024, 5, 2)));
        assert_eq!(book.started_on, Some(day(2024, 5, 2)));
        assert_eq!(book.current_page(), Some(328));

        let unknown = TrackedBook::new("x", "No pages").transition_to(ReadStatus::Completed, day(2024, 5, 2));
        assert_eq!(unknown.effective_progress(), Some(ReadingProgress::Percent(1.0)));
    }

    #[test]
    fn test_transition_back_to_not_started_clears_everything() {
        let mut book = book_with_pages(200).transition_to(ReadStatus::Completed, day(2024, 1, 9));
        book.set_rating(5).unwrap();
        let book = book.transition_to(ReadStatus::NotStarted, day(2024, 2, 1));
        assert_eq!(book.rating, None);
        assert_eq!(book.started_on, None);
        assert_eq!(book.finished_on, None);
        assert_eq!(book.progress, None);
    }

    #[test]
    fn test_reopening_completed_clears_finish_and_rating() {
        let mut book = book_with_pages(200).transition_to(ReadStatus::Completed, day(2024, 1, 9));
        book.set_rating(3).unwrap();
        let book = book.transition_to(ReadStatus::InProgress, day(2024, 2, 1));
        assert_eq!(book.finished_on, None);
        assert_eq!(book.rating, None);
        assert_eq!(book.started_on, Some(day(2024, 1, 9)));
    }

    #[test]
    fn test_progress_entry_requires_page_or_percentage() {
        let id = Uuid::new_v4();
        assert!(ProgressLogEntry::new(id, None, None, Utc::now()).is_err());
        assert!(ProgressLogEntry::new(id, None, Some(1.5), Utc::now()).is_err());
        assert!(ProgressLogEntry::new(id, Some(10), None, Utc::now()).is_ok());
    }

    #[test]
    fn test_resolved_page_from_percentage() {
        let entry = ProgressLogEntry::at_percentage(Uuid::new_v4(), 0.25, Utc::now());
        assert_eq!(entry.resolved_page(Some(400)), Some(100));
        assert_eq!(entry.resolved_page(None), None);

        let entry = ProgressLogEntry::at_page(Uuid::new_v4(), 42, Utc::now());
        assert_eq!(entry.resolved_page(None), Some(42));
    }
}
