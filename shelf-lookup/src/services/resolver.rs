//! Multi-source book resolution
//!
//! **Free-text search** runs up to four steps in priority order, each gated
//! on how many unique candidates have been merged so far:
//!
//! | step | source    | request                         | runs when          |
//! |------|-----------|---------------------------------|--------------------|
//! | 1    | primary   | title + author                  | author given       |
//! | 2    | primary   | author alone                    | author given, < 10 |
//! | 3    | primary   | query alone                     | < 5                |
//! | 4    | secondary | title + author, else query      | < 3                |
//!
//! A failed step is logged and contributes nothing. Only when every attempted
//! step failed and nothing was gathered does the caller see
//! `SourceUnavailable`.
//!
//! **Identifier lookup** asks the primary source, then the secondary.
//!
//! `search` picks between the two: a lone ISBN with no author goes to
//! identifier lookup, anything else to free-text search.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use shelf_common::config::TomlConfig;
use shelf_common::isbn::{looks_like_isbn, normalize_identifier};

use crate::error::{LookupError, SourceError};
use crate::services::relevance;
use crate::services::{GoogleBooksClient, OpenLibraryClient};
use crate::types::{CandidateBook, CatalogSource, ScoredCandidate};

/// Unique-result count below which step 2 runs
const AUTHOR_ONLY_THRESHOLD: usize = 10;
/// Unique-result count below which step 3 runs
const QUERY_ONLY_THRESHOLD: usize = 5;
/// Unique-result count below which the secondary source is tried
const SECONDARY_THRESHOLD: usize = 3;

/// Ordered, identifier-deduplicated candidate set for one resolution
///
/// First occurrence of an identifier wins; later duplicates are dropped.
#[derive(Debug, Default)]
pub struct CandidateAccumulator {
    seen: HashSet<String>,
    candidates: Vec<CandidateBook>,
}

impl CandidateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch, returning how many new candidates were added
    pub fn merge<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = CandidateBook>,
    {
        let before = self.candidates.len();
        for mut candidate in batch {
            let key = normalize_identifier(&candidate.identifier);
            if key.is_empty() {
                continue;
            }
            if self.seen.insert(key.clone()) {
                candidate.identifier = key;
                self.candidates.push(candidate);
            }
        }
        self.candidates.len() - before
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[CandidateBook] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<CandidateBook> {
        self.candidates
    }
}

/// Search steps, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchStep {
    TitleAndAuthor,
    AuthorOnly,
    QueryOnly,
    SecondaryFallback,
}

impl SearchStep {
    fn label(&self) -> &'static str {
        match self {
            SearchStep::TitleAndAuthor => "title+author",
            SearchStep::AuthorOnly => "author only",
            SearchStep::QueryOnly => "query only",
            SearchStep::SecondaryFallback => "secondary fallback",
        }
    }
}

/// Attempt/failure bookkeeping for one resolution
#[derive(Debug, Default)]
struct StepTally {
    attempted: usize,
    failures: Vec<String>,
}

impl StepTally {
    fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failures.len() == self.attempted
    }
}

/// Orchestrates the catalog sources
///
/// Holds no per-call state; one `Resolver` can serve concurrent calls.
#[derive(Clone)]
pub struct Resolver {
    primary: Arc<dyn CatalogSource>,
    secondary: Arc<dyn CatalogSource>,
}

impl Resolver {
    pub fn new(primary: Arc<dyn CatalogSource>, secondary: Arc<dyn CatalogSource>) -> Self {
        Self { primary, secondary }
    }

    /// Google Books as primary, Open Library as secondary, from config
    pub fn from_config(config: &TomlConfig, google_api_key: Option<String>) -> Result<Self, SourceError> {
        let primary = GoogleBooksClient::from_config(&config.sources, google_api_key)?;
        let secondary = OpenLibraryClient::from_config(&config.sources)?;
        Ok(Self::new(Arc::new(primary), Arc::new(secondary)))
    }

    /// Free-text resolution, ranked by relevance
    pub async fn resolve(
        &self,
        query: &str,
        author: Option<&str>,
    ) -> Result<Vec<ScoredCandidate>, LookupError> {
        let query = query.trim();
        let author = author.map(str::trim).filter(|a| !a.is_empty());

        if query.is_empty() && author.is_none() {
            return Err(LookupError::InvalidInput(
                "search needs a query or an author".to_string(),
            ));
        }

        let mut accumulator = CandidateAccumulator::new();
        let mut tally = StepTally::default();

        // Step 1: most specific request first
        if let Some(author) = author {
            if !query.is_empty() {
                self.run_step(
                    SearchStep::TitleAndAuthor,
                    self.primary.search_by_title_author(query, author),
                    &mut accumulator,
                    &mut tally,
                )
                .await;
            }
        }

        // Step 2
        if let Some(author) = author {
            if accumulator.len() < AUTHOR_ONLY_THRESHOLD {
                self.run_step(
                    SearchStep::AuthorOnly,
                    self.primary.search_by_author(author),
                    &mut accumulator,
                    &mut tally,
                )
                .await;
            }
        }

        // Step 3
        if !query.is_empty() && accumulator.len() < QUERY_ONLY_THRESHOLD {
            self.run_step(
                SearchStep::QueryOnly,
                self.primary.search_by_query(query),
                &mut accumulator,
                &mut tally,
            )
            .await;
        }

        // Step 4: secondary source
        if accumulator.len() < SECONDARY_THRESHOLD {
            let secondary = &self.secondary;
            match author {
                Some(author) if !query.is_empty() => {
                    self.run_step(
                        SearchStep::SecondaryFallback,
                        secondary.search_by_title_author(query, author),
                        &mut accumulator,
                        &mut tally,
                    )
                    .await
                }
                Some(author) => {
                    self.run_step(
                        SearchStep::SecondaryFallback,
                        secondary.search_by_author(author),
                        &mut accumulator,
                        &mut tally,
                    )
                    .await
                }
                None => {
                    self.run_step(
                        SearchStep::SecondaryFallback,
                        secondary.search_by_query(query),
                        &mut accumulator,
                        &mut tally,
                    )
                    .await
                }
            }
        }

        if accumulator.is_empty() && tally.all_failed() {
            tracing::error!(
                query = %query,
                failures = tally.failures.len(),
                "Every catalog step failed"
            );
            return Err(LookupError::SourceUnavailable(tally.failures.join("; ")));
        }

        let ranked = relevance::rank(query, author, accumulator.into_candidates());

        tracing::info!(
            query = %query,
            author = ?author,
            steps = tally.attempted,
            failed_steps = tally.failures.len(),
            results = ranked.len(),
            "Resolution complete"
        );

        Ok(ranked)
    }

    /// Run one step, merging its results; failures are logged and swallowed
    async fn run_step<F>(
        &self,
        step: SearchStep,
        request: F,
        accumulator: &mut CandidateAccumulator,
        tally: &mut StepTally,
    ) where
        F: Future<Output = Result<Vec<CandidateBook>, SourceError>>,
    {
        tally.attempted += 1;
        match request.await {
            Ok(batch) => {
                let returned = batch.len();
                let added = accumulator.merge(batch);
                tracing::debug!(
                    step = step.label(),
                    returned,
                    added,
                    total = accumulator.len(),
                    "Search step merged"
                );
            }
            Err(e) => {
                tracing::warn!(step = step.label(), error = %e, "Search step failed, continuing");
                tally.failures.push(format!("{}: {}", step.label(), e));
            }
        }
    }

    /// Route user input: a bare ISBN is looked up directly, anything else is searched
    pub async fn search(
        &self,
        query: &str,
        author: Option<&str>,
    ) -> Result<Vec<ScoredCandidate>, LookupError> {
        let has_author = author.is_some_and(|a| !a.trim().is_empty());
        if has_author || !looks_like_isbn(query) {
            return self.resolve(query, author).await;
        }

        tracing::debug!(query = %query, "Input looks like an ISBN, using identifier lookup");
        let candidate = self.resolve_by_identifier(query).await?;
        let score = relevance::score_candidate(query, None, &candidate);
        Ok(vec![ScoredCandidate { score, candidate }])
    }

    /// Resolve a single book by ISBN
    pub async fn resolve_by_identifier(&self, identifier: &str) -> Result<CandidateBook, LookupError> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return Err(LookupError::InvalidInput(
                "identifier is empty after normalization".to_string(),
            ));
        }

        let mut failures = Vec::new();

        for source in [&self.primary, &self.secondary] {
            match source.search_by_identifier(&identifier).await {
                Ok(found) => match found.into_iter().next() {
                    Some(candidate) => {
                        tracing::info!(
                            identifier = %identifier,
                            source = source.kind().name(),
                            title = %candidate.title,
                            "Identifier resolved"
                        );
                        return Ok(candidate);
                    }
                    None => {
                        tracing::debug!(
                            identifier = %identifier,
                            source = source.kind().name(),
                            "No match for identifier"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        identifier = %identifier,
                        source = source.kind().name(),
                        error = %e,
                        "Identifier lookup failed"
                    );
                    failures.push(format!("{}: {}", source.kind().name(), e));
                }
            }
        }

        if failures.is_empty() {
            Err(LookupError::NotFound(identifier))
        } else {
            Err(LookupError::SourceUnavailable(failures.join("; ")))
        }
    }
}
