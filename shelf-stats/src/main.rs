//! shelf-stats - reading analytics CLI
//!
//! Loads a library snapshot and prints streak, goals, pacing and challenge
//! status as of the local current time.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;

use shelf_common::config::{load_config, RootFolderInitializer, RootFolderResolver};
use shelf_stats::goals::GoalProgress;
use shelf_stats::{AnalyticsEngine, AnalyticsSettings, DerivedAnalytics, JsonSnapshotStore, SnapshotStore};

/// Command-line arguments for shelf-stats
#[derive(Parser, Debug)]
#[command(name = "shelf-stats")]
#[command(about = "Reading streaks, goals and pace from a library snapshot")]
#[command(version)]
struct Args {
    /// Path to config.toml (defaults to the platform config folder)
    #[arg(short, long, env = "SHELF_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding library.json when --snapshot is not given
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Snapshot JSON file
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Print JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Print only the reminder facts (streak and today's activity) as JSON
    #[arg(long, conflicts_with = "json")]
    reminder: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, origin) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;
    shelf_common::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    origin.log();

    info!("Starting shelf-stats v{}", env!("CARGO_PKG_VERSION"));

    let snapshot_path = match args.snapshot {
        Some(path) => path,
        None => {
            let root_folder = RootFolderResolver::new()
                .with_cli_arg(args.root_folder)
                .with_toml(&config)
                .resolve();
            RootFolderInitializer::new(root_folder).snapshot_path()
        }
    };

    let store = JsonSnapshotStore::new(snapshot_path);
    let snapshot = store
        .load()
        .with_context(|| format!("Failed to load snapshot {}", store.path().display()))?;

    let engine = AnalyticsEngine::new(AnalyticsSettings::from_config(&config));
    let analytics = engine.compute(&snapshot, &Local::now());

    if args.reminder {
        println!("{}", serde_json::to_string_pretty(&analytics.reminder_facts())?);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
    } else {
        print_report(&analytics);
    }

    Ok(())
}

fn print_report(analytics: &DerivedAnalytics) {
    println!("Reading report for {}", analytics.generated_for);
    println!();

    let today = if analytics.has_activity_today {
        "read today"
    } else {
        "nothing logged today"
    };
    println!("Streak:    {} days ({})", analytics.current_streak_days, today);
    if !analytics.freezes_consumed.is_empty() {
        let days: Vec<String> = analytics.freezes_consumed.iter().map(|d| d.to_string()).collect();
        println!("           freezes spent on {}", days.join(", "));
    }

    if let Some(goal) = &analytics.daily_goal {
        println!("Today:     {}", goal_line(goal));
    }
    if let Some(goal) = &analytics.weekly_goal {
        println!("This week: {}", goal_line(goal));
    }

    if let Some(challenge) = &analytics.challenge {
        println!(
            "Challenge: {}/{} books ({})",
            challenge.completed,
            challenge.goal,
            challenge.standing()
        );
    }

    if !analytics.books.is_empty() {
        println!();
        println!("In progress:");
        for book in &analytics.books {
            let position = match (book.current_page, book.page_count) {
                (Some(current), Some(total)) => format!("p. {}/{}", current, total),
                (Some(current), None) => format!("p. {}", current),
                _ => "no progress".to_string(),
            };
            let pace = book
                .pages_per_day
                .map(|p| format!("{:.1} pages/day", p))
                .unwrap_or_else(|| "pace unknown".to_string());
            let finish = book
                .estimated_completion
                .map(|e| format!(", done ~{} ({} days)", e.date, e.days_needed))
                .unwrap_or_default();
            println!("  {}  {}, {}{}", book.title, position, pace, finish);
        }
    }

    let summary = &analytics.summary;
    println!();
    let counts: Vec<String> = summary
        .status_counts()
        .iter()
        .map(|(status, count)| format!("{}: {}", status.label(), count))
        .collect();
    println!("Library:   {}", counts.join(", "));
    println!("           {} pages logged this year", summary.pages_logged_this_year);
    if let Some(rating) = summary.average_rating {
        println!("           average rating {:.1}", rating);
    }
    if summary.quotes + summary.thoughts > 0 {
        println!("           {} quotes, {} notes", summary.quotes, summary.thoughts);
    }
}

fn goal_line(goal: &GoalProgress) -> String {
    if goal.reached {
        format!("{}/{} pages, goal reached", goal.pages_read, goal.goal)
    } else {
        format!("{}/{} pages, {} to go", goal.pages_read, goal.goal, goal.remaining())
    }
}
