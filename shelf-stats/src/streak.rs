//! Reading streak calculation
//!
//! Walks backward one local day at a time from today. An active day extends
//! the streak; a day already covered by a persisted freeze is skipped; a
//! missed day may spend one of the user's freezes if the freeze window
//! allows it; anything else ends the streak.
//!
//! Today never breaks a streak: if nothing is logged yet, counting starts
//! from yesterday. Freezes spent on a gap that does not lead back to another
//! active day are handed back.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelf_common::config::{FreezeWindowSetting, StreakConfig};
use shelf_common::time::same_iso_week;

/// How often a freeze may be spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreezeWindow {
    /// At most one freeze per ISO calendar week
    CalendarWeek,
    /// At most one freeze within any `days`-long window
    Rolling { days: u32 },
}

impl FreezeWindow {
    /// May a freeze be spent on `day`, given freezes already spent?
    fn permits<'a, I>(&self, day: NaiveDate, spent: I) -> bool
    where
        I: IntoIterator<Item = &'a NaiveDate>,
    {
        let mut spent = spent.into_iter();
        match *self {
            FreezeWindow::CalendarWeek => !spent.any(|other| same_iso_week(day, *other)),
            FreezeWindow::Rolling { days } => {
                let window = i64::from(days.max(1));
                !spent.any(|other| (day - *other).num_days().abs() < window)
            }
        }
    }
}

/// Freezes the user holds and the policy for spending them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeAllowance {
    pub available: u32,
    pub window: FreezeWindow,
}

impl FreezeAllowance {
    /// No freezes at all
    pub fn none() -> Self {
        Self {
            available: 0,
            window: FreezeWindow::CalendarWeek,
        }
    }

    pub fn from_config(config: &StreakConfig) -> Self {
        let window = match config.freeze_window {
            FreezeWindowSetting::CalendarWeek => FreezeWindow::CalendarWeek,
            FreezeWindowSetting::Rolling => FreezeWindow::Rolling {
                days: config.rolling_window_days,
            },
        };
        Self {
            available: config.freezes_available,
            window,
        }
    }
}

impl Default for FreezeAllowance {
    fn default() -> Self {
        Self::none()
    }
}

/// Streak length plus the freezes the walk had to spend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakOutcome {
    pub days: u32,
    /// Newly spent freezes, most recent first
    pub freezes_consumed: Vec<NaiveDate>,
}

/// True if any activity was logged on `today`
pub fn has_activity_today(activity_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> bool {
    activity_days.contains(&today)
}

/// Current consecutive-day streak ending today
pub fn current_streak(
    activity_days: &BTreeSet<NaiveDate>,
    frozen_days: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    allowance: &FreezeAllowance,
) -> StreakOutcome {
    let Some(&earliest) = activity_days.iter().next() else {
        return StreakOutcome::default();
    };

    let start = if activity_days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut days = 0u32;
    let mut consumed: Vec<NaiveDate> = Vec::new();
    let mut committed = 0usize;
    let mut cursor = start;

    while let Some(day) = cursor {
        if day < earliest {
            break;
        }

        if activity_days.contains(&day) {
            days += 1;
            committed = consumed.len();
        } else if frozen_days.contains(&day) {
            // already covered
        } else if (consumed.len() as u32) < allowance.available
            && allowance
                .window
                .permits(day, consumed.iter().chain(frozen_days.iter()))
        {
            consumed.push(day);
        } else {
            break;
        }

        cursor = day.pred_opt();
    }

    consumed.truncate(committed);

    StreakOutcome {
        days,
        freezes_consumed: consumed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    // 2024-05-16 is a Thursday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 16).unwrap()
    }

    fn ago(n: i64) -> NaiveDate {
        today() - Duration::days(n)
    }

    fn days(offsets: &[i64]) -> BTreeSet<NaiveDate> {
        offsets.iter().map(|n| ago(*n)).collect()
    }

    fn freezes(available: u32) -> FreezeAllowance {
        FreezeAllowance {
            available,
            window: FreezeWindow::Rolling { days: 7 },
        }
    }

    #[test]
    fn test_no_activity_is_zero() {
        let outcome = current_streak(&BTreeSet::new(), &BTreeSet::new(), today(), &freezes(3));
        assert_eq!(outcome.days, 0);
        assert!(outcome.freezes_consumed.is_empty());
    }

    #[test]
    fn test_gap_without_freeze_breaks() {
        let activity = days(&[0, 1, 2, 4, 5]);
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &FreezeAllowance::none());
        assert_eq!(outcome.days, 3);
    }

    #[test]
    fn test_freeze_bridges_gap() {
        let activity = days(&[0, 1, 2, 4, 5]);
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &freezes(1));
        assert_eq!(outcome.days, 5);
        assert_eq!(outcome.freezes_consumed, vec![ago(3)]);
    }

    #[test]
    fn test_today_pending_counts_from_yesterday() {
        let activity = days(&[1, 2]);
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &FreezeAllowance::none());
        assert_eq!(outcome.days, 2);
        assert!(!has_activity_today(&activity, today()));
    }

    #[test]
    fn test_nothing_today_or_yesterday_is_zero() {
        let activity = days(&[2, 3]);
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &FreezeAllowance::none());
        assert_eq!(outcome.days, 0);
    }

    #[test]
    fn test_persisted_freeze_covers_day() {
        let activity = days(&[0, 1, 3]);
        let frozen = days(&[2]);
        let outcome = current_streak(&activity, &frozen, today(), &FreezeAllowance::none());
        assert_eq!(outcome.days, 3);
        assert!(outcome.freezes_consumed.is_empty());
    }

    #[test]
    fn test_rolling_window_blocks_second_freeze() {
        // gaps at 2 and 5 are three days apart: one rolling week allows only one
        let activity = days(&[0, 1, 3, 4, 6]);
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &freezes(2));
        assert_eq!(outcome.days, 4);
        assert_eq!(outcome.freezes_consumed, vec![ago(2)]);
    }

    #[test]
    fn test_calendar_week_allows_freeze_per_week() {
        // Thu 16 May; gaps on Tue 14 May and Thu 9 May are in different ISO weeks
        let activity = days(&[0, 1, 3, 4, 5, 6, 8]);
        let allowance = FreezeAllowance {
            available: 2,
            window: FreezeWindow::CalendarWeek,
        };
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &allowance);
        assert_eq!(outcome.days, 7);
        assert_eq!(outcome.freezes_consumed, vec![ago(2), ago(7)]);
    }

    #[test]
    fn test_calendar_week_blocks_same_week() {
        // gaps on Tue 14 and Mon 13 May share an ISO week
        let activity = days(&[0, 1, 4]);
        let allowance = FreezeAllowance {
            available: 5,
            window: FreezeWindow::CalendarWeek,
        };
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &allowance);
        assert_eq!(outcome.days, 2);
        assert!(outcome.freezes_consumed.is_empty());
    }

    #[test]
    fn test_unused_trailing_freeze_is_returned() {
        // gap at 2, and nothing before 1 except an activity far back at 30
        let activity = days(&[0, 1, 30]);
        let outcome = current_streak(&activity, &BTreeSet::new(), today(), &freezes(1));
        assert_eq!(outcome.days, 2);
        assert!(outcome.freezes_consumed.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = StreakConfig {
            freezes_available: 2,
            freeze_window: FreezeWindowSetting::Rolling,
            rolling_window_days: 10,
        };
        let allowance = FreezeAllowance::from_config(&config);
        assert_eq!(allowance.available, 2);
        assert_eq!(allowance.window, FreezeWindow::Rolling { days: 10 });
    }
}
