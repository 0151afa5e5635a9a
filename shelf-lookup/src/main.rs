//! shelf-lookup - book metadata resolution CLI
//!
//! Searches Google Books (primary) and Open Library (fallback), merges the
//! results by ISBN and prints them ranked by relevance.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use shelf_common::config::{load_config, RootFolderInitializer, RootFolderResolver};
use shelf_lookup::config::resolve_google_api_key;
use shelf_lookup::services::{build_http_client, CoverCache};
use shelf_lookup::{CandidateBook, LookupError, Resolver, ScoredCandidate};

/// Command-line arguments for shelf-lookup
#[derive(Parser, Debug)]
#[command(name = "shelf-lookup")]
#[command(about = "Find book metadata across catalog sources")]
#[command(version)]
struct Args {
    /// Path to config.toml (defaults to the platform config folder)
    #[arg(short, long, env = "SHELF_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder for the cover cache
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Free-text search, optionally narrowed by author; a bare ISBN is looked up directly
    Search {
        /// Title or free-text query
        #[arg(default_value = "")]
        query: String,

        #[arg(short, long)]
        author: Option<String>,

        /// Maximum results to print
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Look up a single book by ISBN
    Isbn {
        identifier: String,

        #[arg(long)]
        json: bool,
    },

    /// Resolve an ISBN and download its cover into the cache
    Cover { identifier: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, origin) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;
    shelf_common::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    origin.log();

    info!("Starting shelf-lookup v{}", env!("CARGO_PKG_VERSION"));

    let api_key = resolve_google_api_key(&config);
    let resolver = Resolver::from_config(&config, api_key).context("Failed to build catalog clients")?;

    match args.command {
        Command::Search {
            query,
            author,
            limit,
            json,
        } => {
            // a pasted ISBN goes straight to identifier lookup
            let results = resolver
                .search(&query, author.as_deref())
                .await
                .map_err(explain)?;
            let shown: Vec<ScoredCandidate> = results.into_iter().take(limit).collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else if shown.is_empty() {
                println!("No matches.");
            } else {
                for scored in &shown {
                    println!("{:>4}  {}", scored.score, describe(&scored.candidate));
                }
            }
        }

        Command::Isbn { identifier, json } => {
            let candidate = resolver
                .resolve_by_identifier(&identifier)
                .await
                .map_err(explain)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&candidate)?);
            } else {
                println!("{}", describe(&candidate));
                if let Some(pages) = candidate.page_count {
                    println!("      {} pages", pages);
                }
                if let Some(description) = &candidate.description {
                    println!("      {}", description);
                }
            }
        }

        Command::Cover { identifier } => {
            let root_folder = RootFolderResolver::new()
                .with_cli_arg(args.root_folder)
                .with_toml(&config)
                .resolve();
            let initializer = RootFolderInitializer::new(root_folder);
            initializer.ensure_directory_exists()?;

            let candidate = resolver
                .resolve_by_identifier(&identifier)
                .await
                .map_err(explain)?;

            let cache = CoverCache::new(initializer.covers_path(), config.cover_cache.memory_capacity);
            let http_client = build_http_client(Duration::from_secs(config.sources.timeout_secs))?;

            match cache.fetch_cover(&http_client, &candidate).await? {
                Some(bytes) => println!(
                    "Cached cover for {} ({} bytes) in {}",
                    candidate.identifier,
                    bytes.len(),
                    cache.disk_dir().display()
                ),
                None => println!("{} has no cover image", candidate.identifier),
            }
        }
    }

    Ok(())
}

fn describe(candidate: &CandidateBook) -> String {
    let mut line = candidate.title.clone();
    if !candidate.authors.is_empty() {
        line.push_str(" by ");
        line.push_str(&candidate.author_line());
    }
    if let Some(date) = &candidate.published_date {
        line.push_str(&format!(" ({})", date));
    }
    line.push_str(&format!(" [{}, {}]", candidate.identifier, candidate.source.name()));
    line
}

/// Attach the user-facing hint for each failure class
fn explain(err: LookupError) -> anyhow::Error {
    let hint = if err.suggests_text_search() {
        "try a free-text search instead"
    } else if err.is_retryable() {
        "check your connection and retry"
    } else {
        "check the input"
    };
    anyhow::anyhow!("{} ({})", err, hint)
}
