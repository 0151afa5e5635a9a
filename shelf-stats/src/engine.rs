//! Analytics over one library snapshot
//!
//! `AnalyticsEngine::compute` derives everything the dashboard and the
//! reminder scheduler show. The result is rebuilt on every call and never
//! persisted.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use shelf_common::config::TomlConfig;
use shelf_common::models::ReadStatus;
use tracing::{debug, info};

use crate::challenge::{challenge_status, completed_in_year, ChallengeStatus};
use crate::goals::{daily_progress, page_deltas, weekly_progress, GoalProgress};
use crate::pace::BookPacing;
use crate::snapshot::LibrarySnapshot;
use crate::streak::{current_streak, has_activity_today, FreezeAllowance};
use crate::summary::LibrarySummary;

/// Goals and freeze policy the engine evaluates against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    pub daily_pages: Option<u32>,
    pub weekly_pages: Option<u32>,
    pub yearly_books: Option<u32>,
    pub freezes: FreezeAllowance,
}

impl AnalyticsSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            daily_pages: config.goals.daily_pages,
            weekly_pages: config.goals.weekly_pages,
            yearly_books: config.goals.yearly_books,
            freezes: FreezeAllowance::from_config(&config.streak),
        }
    }
}

/// The two facts the reminder scheduler needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFacts {
    pub current_streak_days: u32,
    pub has_activity_today: bool,
}

/// Everything derived from a snapshot for one local day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedAnalytics {
    pub generated_for: NaiveDate,
    pub current_streak_days: u32,
    pub has_activity_today: bool,
    /// Freezes the streak had to spend; the host persists these as `StreakFreeze` records
    pub freezes_consumed: Vec<NaiveDate>,
    pub daily_goal: Option<GoalProgress>,
    pub weekly_goal: Option<GoalProgress>,
    pub books: Vec<BookPacing>,
    pub challenge: Option<ChallengeStatus>,
    pub summary: LibrarySummary,
}

impl DerivedAnalytics {
    pub fn reminder_facts(&self) -> ReminderFacts {
        ReminderFacts {
            current_streak_days: self.current_streak_days,
            has_activity_today: self.has_activity_today,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    settings: AnalyticsSettings,
}

impl AnalyticsEngine {
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self { settings }
    }

    /// Derive analytics as of `now`; day boundaries follow `now`'s time zone
    pub fn compute<Tz: TimeZone>(&self, snapshot: &LibrarySnapshot, now: &DateTime<Tz>) -> DerivedAnalytics {
        let tz = now.timezone();
        let today = now.date_naive();

        let activity = snapshot.activity_days(&tz);
        let streak = current_streak(&activity, &snapshot.frozen_days(), today, &self.settings.freezes);
        debug!(
            "Streak {} days ({} activity days, {} freezes spent)",
            streak.days,
            activity.len(),
            streak.freezes_consumed.len()
        );

        let deltas = page_deltas(&snapshot.books, &snapshot.progress, &tz);
        let daily_goal = self
            .settings
            .daily_pages
            .map(|goal| daily_progress(&deltas, today, goal));
        let weekly_goal = self
            .settings
            .weekly_pages
            .map(|goal| weekly_progress(&deltas, today, goal));

        let books: Vec<BookPacing> = snapshot
            .books
            .iter()
            .filter(|book| book.status == ReadStatus::InProgress)
            .map(|book| BookPacing::for_book(book, &snapshot.progress, today))
            .collect();

        let challenge = self.settings.yearly_books.map(|goal| {
            let completed = completed_in_year(&snapshot.books, today.year());
            challenge_status(goal, completed, today)
        });

        let summary = LibrarySummary::build(&snapshot.books, &snapshot.notes, &deltas, today.year());

        info!(
            "Analytics for {}: streak {}, {} books in progress",
            today,
            streak.days,
            books.len()
        );

        DerivedAnalytics {
            generated_for: today,
            current_streak_days: streak.days,
            has_activity_today: has_activity_today(&activity, today),
            freezes_consumed: streak.freezes_consumed,
            daily_goal,
            weekly_goal,
            books,
            challenge,
            summary,
        }
    }
}
