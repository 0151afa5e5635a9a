//! Daily and weekly page goals

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use shelf_common::models::{ProgressLogEntry, TrackedBook};
use shelf_common::time::{local_day, same_iso_week};
use uuid::Uuid;

/// Pages gained by one progress entry, on the local day it was logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDelta {
    pub book_id: Uuid,
    pub day: NaiveDate,
    pub pages: u32,
}

/// Pages read in a period against the configured goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub pages_read: u32,
    pub goal: u32,
    pub reached: bool,
}

impl GoalProgress {
    pub fn new(pages_read: u32, goal: u32) -> Self {
        Self {
            pages_read,
            goal,
            reached: pages_read >= goal,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.pages_read)
    }
}

/// Per-entry page gains
///
/// Each entry is compared with the previous resolved page of the same book;
/// a book's first entry counts from page 0. Going backwards counts as 0.
/// Entries whose page cannot be resolved are skipped and do not move the
/// baseline.
pub fn page_deltas<Tz: TimeZone>(
    books: &[TrackedBook],
    entries: &[ProgressLogEntry],
    tz: &Tz,
) -> Vec<PageDelta> {
    let page_counts: HashMap<Uuid, Option<u32>> =
        books.iter().map(|book| (book.id, book.page_count)).collect();

    let mut ordered: Vec<&ProgressLogEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.logged_at);

    let mut last_page: HashMap<Uuid, u32> = HashMap::new();
    let mut deltas = Vec::with_capacity(ordered.len());

    for entry in ordered {
        let page_count = page_counts.get(&entry.book_id).copied().flatten();
        let Some(page) = entry.resolved_page(page_count) else {
            continue;
        };
        let previous = last_page.insert(entry.book_id, page).unwrap_or(0);
        deltas.push(PageDelta {
            book_id: entry.book_id,
            day: local_day(&entry.logged_at, tz),
            pages: page.saturating_sub(previous),
        });
    }

    deltas
}

fn sum_pages<'a>(deltas: impl Iterator<Item = &'a PageDelta>) -> u32 {
    deltas.fold(0u32, |acc, delta| acc.saturating_add(delta.pages))
}

/// Pages read on `today` against `goal`
pub fn daily_progress(deltas: &[PageDelta], today: NaiveDate, goal: u32) -> GoalProgress {
    let pages = sum_pages(deltas.iter().filter(|delta| delta.day == today));
    GoalProgress::new(pages, goal)
}

/// Pages read in the ISO week containing `today` against `goal`
pub fn weekly_progress(deltas: &[PageDelta], today: NaiveDate, goal: u32) -> GoalProgress {
    let pages = sum_pages(deltas.iter().filter(|delta| same_iso_week(delta.day, today)));
    GoalProgress::new(pages, goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn book(pages: Option<u32>) -> TrackedBook {
        let mut book = TrackedBook::new("9780000000001", "Goal book");
        book.page_count = pages;
        book
    }

    #[test]
    fn test_deltas_per_book_from_zero() {
        let a = book(Some(200));
        let b = book(Some(300));
        let entries = vec![
            ProgressLogEntry::at_page(a.id, 30, at(13, 9)),
            ProgressLogEntry::at_page(b.id, 10, at(13, 10)),
            ProgressLogEntry::at_page(a.id, 50, at(14, 9)),
            ProgressLogEntry::at_page(a.id, 45, at(14, 12)),
        ];

        let deltas = page_deltas(&[a.clone(), b.clone()], &entries, &Utc);
        let pages: Vec<u32> = deltas.iter().map(|d| d.pages).collect();
        assert_eq!(pages, vec![30, 10, 20, 0]);
    }

    #[test]
    fn test_percentage_entries_resolved_with_page_count() {
        let a = book(Some(200));
        let entries = vec![
            ProgressLogEntry::at_percentage(a.id, 0.1, at(14, 8)),
            ProgressLogEntry::at_percentage(a.id, 0.25, at(14, 20)),
        ];
        let deltas = page_deltas(&[a], &entries, &Utc);
        let pages: Vec<u32> = deltas.iter().map(|d| d.pages).collect();
        assert_eq!(pages, vec![20, 30]);
    }

    #[test]
    fn test_unresolvable_entries_skipped() {
        let a = book(None);
        let entries = vec![
            ProgressLogEntry::at_page(a.id, 40, at(14, 8)),
            ProgressLogEntry::at_percentage(a.id, 0.5, at(14, 9)),
            ProgressLogEntry::at_page(a.id, 55, at(14, 10)),
        ];
        let deltas = page_deltas(&[a], &entries, &Utc);
        let pages: Vec<u32> = deltas.iter().map(|d| d.pages).collect();
        assert_eq!(pages, vec![40, 15]);
    }

    #[test]
    fn test_daily_and_weekly_progress() {
        // Thu 16 May 2024; Mon 13 May starts the ISO week
        let a = book(Some(500));
        let entries = vec![
            ProgressLogEntry::at_page(a.id, 100, at(10, 9)),
            ProgressLogEntry::at_page(a.id, 130, at(13, 9)),
            ProgressLogEntry::at_page(a.id, 150, at(16, 9)),
            ProgressLogEntry::at_page(a.id, 170, at(16, 21)),
        ];
        let deltas = page_deltas(&[a], &entries, &Utc);

        let daily = daily_progress(&deltas, day(16), 30);
        assert_eq!(daily.pages_read, 40);
        assert!(daily.reached);

        let weekly = weekly_progress(&deltas, day(16), 100);
        assert_eq!(weekly.pages_read, 70);
        assert!(!weekly.reached);
        assert_eq!(weekly.remaining(), 30);
    }

    #[test]
    fn test_local_day_decides_bucket() {
        let a = book(Some(500));
        // 23:30 UTC on the 15th is already the 16th at UTC+3
        let entries = vec![ProgressLogEntry::at_page(
            a.id,
            25,
            Utc.with_ymd_and_hms(2024, 5, 15, 23, 30, 0).unwrap(),
        )];
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();

        let utc = page_deltas(&[a.clone()], &entries, &Utc);
        assert_eq!(daily_progress(&utc, day(16), 10).pages_read, 0);

        let local = page_deltas(&[a], &entries, &plus_three);
        assert_eq!(daily_progress(&local, day(16), 10).pages_read, 25);
    }
}
