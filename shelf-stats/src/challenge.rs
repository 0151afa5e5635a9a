//! Annual reading challenge

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shelf_common::models::{ReadStatus, TrackedBook};

const DAYS_PER_YEAR: f64 = 365.0;

/// Where the reader stands against a books-per-year goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChallengeStatus {
    pub goal: u32,
    pub completed: u32,
    /// Books a reader on schedule would have finished by today
    pub expected: f64,
    /// Positive when ahead of schedule
    pub schedule_delta: i64,
}

impl ChallengeStatus {
    pub fn is_ahead(&self) -> bool {
        self.schedule_delta > 0
    }

    pub fn is_behind(&self) -> bool {
        self.schedule_delta < 0
    }

    /// "on schedule", "3 ahead" or "2 behind"
    pub fn standing(&self) -> String {
        if self.is_ahead() {
            format!("{} ahead", self.schedule_delta)
        } else if self.is_behind() {
            format!("{} behind", -self.schedule_delta)
        } else {
            "on schedule".to_string()
        }
    }
}

/// Schedule delta for `completed` books against a yearly `goal` as of `today`
pub fn challenge_status(goal: u32, completed: u32, today: NaiveDate) -> ChallengeStatus {
    let expected = f64::from(goal) * f64::from(today.ordinal()) / DAYS_PER_YEAR;
    let schedule_delta = i64::from(completed) - expected.round() as i64;

    ChallengeStatus {
        goal,
        completed,
        expected,
        schedule_delta,
    }
}

/// Completed books whose finish date falls in `year`
pub fn completed_in_year(books: &[TrackedBook], year: i32) -> u32 {
    books
        .iter()
        .filter(|book| book.status == ReadStatus::Completed)
        .filter(|book| book.finished_on.is_some_and(|day| day.year() == year))
        .count() as u32
}
