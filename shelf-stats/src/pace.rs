//! Reading pace and completion estimates
//!
//! Each step returns `None` when the data needed is missing, so the chain
//! from progress log to finish date is a plain `Option` pipeline.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shelf_common::models::{ProgressLogEntry, TrackedBook};
use shelf_common::time::whole_days_between;

/// A resolved page at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePoint {
    pub page: u32,
    pub at: DateTime<Utc>,
}

/// When a book should be finished at the current pace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEstimate {
    pub days_needed: u32,
    pub date: NaiveDate,
}

/// Pages per day between two readings
///
/// Less than one whole day between the readings counts as one day. `None`
/// unless the newer reading is further into the book.
pub fn pace(older: &PagePoint, newer: &PagePoint) -> Option<f64> {
    if newer.page <= older.page {
        return None;
    }
    let days = whole_days_between(&older.at, &newer.at).max(1);
    Some(f64::from(newer.page - older.page) / days as f64)
}

/// Progress points for one book, oldest first, skipping entries with no resolvable page
pub fn page_points(book: &TrackedBook, entries: &[ProgressLogEntry]) -> Vec<PagePoint> {
    let mut points: Vec<PagePoint> = entries
        .iter()
        .filter(|entry| entry.book_id == book.id)
        .filter_map(|entry| {
            entry.resolved_page(book.page_count).map(|page| PagePoint {
                page,
                at: entry.logged_at,
            })
        })
        .collect();
    points.sort_by_key(|point| point.at);
    points
}

/// Pace over the two most recent entries for `book`
pub fn pace_for_book(book: &TrackedBook, entries: &[ProgressLogEntry]) -> Option<f64> {
    match page_points(book, entries).as_slice() {
        [.., older, newer] => pace(older, newer),
        _ => None,
    }
}

/// Days left and finish date at `pages_per_day`
pub fn estimate_completion(
    total_pages: u32,
    current_page: u32,
    pages_per_day: Option<f64>,
    today: NaiveDate,
) -> Option<CompletionEstimate> {
    let pace = pages_per_day.filter(|p| p.is_finite() && *p > 0.0)?;
    let remaining = total_pages.saturating_sub(current_page);
    let days_needed = (f64::from(remaining) / pace).ceil() as u32;
    let date = today.checked_add_signed(Duration::days(i64::from(days_needed)))?;

    Some(CompletionEstimate { days_needed, date })
}

/// Pace and estimate for one in-progress book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPacing {
    pub book_id: uuid::Uuid,
    pub title: String,
    pub current_page: Option<u32>,
    pub page_count: Option<u32>,
    pub pages_per_day: Option<f64>,
    pub estimated_completion: Option<CompletionEstimate>,
}

impl BookPacing {
    pub fn for_book(book: &TrackedBook, entries: &[ProgressLogEntry], today: NaiveDate) -> Self {
        let latest_logged = page_points(book, entries).last().map(|point| point.page);
        // stored progress and the log can lag each other; the further one wins
        let current_page = book.current_page().into_iter().chain(latest_logged).max();
        let pages_per_day = pace_for_book(book, entries);
        let estimated_completion = book
            .page_count
            .zip(current_page)
            .and_then(|(total, current)| estimate_completion(total, current, pages_per_day, today));

        Self {
            book_id: book.id,
            title: book.title.clone(),
            current_page,
            page_count: book.page_count,
            pages_per_day,
            estimated_completion,
        }
    }
}
