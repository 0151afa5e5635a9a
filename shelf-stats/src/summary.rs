//! Library-wide counts

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use shelf_common::models::{BookNote, NoteKind, ReadStatus, TrackedBook};

use crate::goals::PageDelta;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrarySummary {
    pub not_started: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub pages_logged_this_year: u32,
    /// Mean rating over completed, rated books
    pub average_rating: Option<f64>,
    pub quotes: u32,
    pub thoughts: u32,
}

impl LibrarySummary {
    /// Book count per status, in reading order
    pub fn status_counts(&self) -> [(ReadStatus, u32); 3] {
        [
            (ReadStatus::NotStarted, self.not_started),
            (ReadStatus::InProgress, self.in_progress),
            (ReadStatus::Completed, self.completed),
        ]
    }

    pub fn build(books: &[TrackedBook], notes: &[BookNote], deltas: &[PageDelta], year: i32) -> Self {
        let mut summary = Self::default();

        for book in books {
            match book.status {
                ReadStatus::NotStarted => summary.not_started += 1,
                ReadStatus::InProgress => summary.in_progress += 1,
                ReadStatus::Completed => summary.completed += 1,
            }
        }

        let ratings: Vec<f64> = books
            .iter()
            .filter_map(|book| book.effective_rating())
            .map(f64::from)
            .collect();
        if !ratings.is_empty() {
            summary.average_rating = Some(ratings.iter().sum::<f64>() / ratings.len() as f64);
        }

        summary.pages_logged_this_year = deltas
            .iter()
            .filter(|delta| delta.day.year() == year)
            .fold(0u32, |acc, delta| acc.saturating_add(delta.pages));

        for note in notes {
            match note.kind {
                NoteKind::Quote { .. } => summary.quotes += 1,
                NoteKind::Thought => summary.thoughts += 1,
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_counts_and_average_rating() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut rated = TrackedBook::new("9780000000001", "A").transition_to(ReadStatus::Completed, day);
        rated.set_rating(4).unwrap();
        let mut other = TrackedBook::new("9780000000002", "B").transition_to(ReadStatus::Completed, day);
        other.set_rating(5).unwrap();
        // rating on an unfinished book is ignored
        let mut reading = TrackedBook::new("9780000000003", "C").transition_to(ReadStatus::InProgress, day);
        reading.rating = Some(1);
        let shelved = TrackedBook::new("9780000000004", "D");

        let notes = vec![
            BookNote {
                book_id: rated.id,
                kind: NoteKind::Quote { page: Some(12) },
                text: "a line".to_string(),
                created_at: Utc::now(),
            },
            BookNote {
                book_id: rated.id,
                kind: NoteKind::Thought,
                text: "a thought".to_string(),
                created_at: Utc::now(),
            },
        ];
        let deltas = vec![
            PageDelta { book_id: reading.id, day, pages: 30 },
            PageDelta {
                book_id: reading.id,
                day: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                pages: 99,
            },
        ];

        let summary = LibrarySummary::build(&[rated, other, reading, shelved], &notes, &deltas, 2024);
        assert_eq!((summary.not_started, summary.in_progress, summary.completed), (1, 1, 2));
        assert_eq!(
            summary.status_counts(),
            [
                (ReadStatus::NotStarted, 1),
                (ReadStatus::InProgress, 1),
                (ReadStatus::Completed, 2)
            ]
        );
        assert_eq!(summary.average_rating, Some(4.5));
        assert_eq!(summary.pages_logged_this_year, 30);
        assert_eq!((summary.quotes, summary.thoughts), (1, 1));
    }

    #[test]
    fn test_empty_library() {
        let summary = LibrarySummary::build(&[], &[], &[], 2024);
        assert_eq!(summary, LibrarySummary::default());
        assert_eq!(summary.average_rating, None);
    }
}
