//! Relevance scoring for search candidates
//!
//! Integer score per candidate, summed from:
//! - each query token: +10 if it equals a title token, else +5 if the title
//!   contains it as a substring
//! - each author token found in the candidate's joined author line: +8
//! - +20 if every query token is also a title token
//!
//! Tokens are lowercase, whitespace-separated, at least two characters long,
//! and collapsed into a set. Scores are not normalized by length.

use std::collections::HashSet;

use crate::types::{CandidateBook, ScoredCandidate};

pub const EXACT_TOKEN_WEIGHT: i32 = 10;
pub const SUBSTRING_WEIGHT: i32 = 5;
pub const AUTHOR_TOKEN_WEIGHT: i32 = 8;
pub const ALL_TOKENS_BONUS: i32 = 20;

/// Lowercase word set, words shorter than two characters dropped
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() >= 2)
        .collect()
}

/// Pre-tokenized query, reused across every candidate of one ranking
#[derive(Debug, Clone)]
pub struct QueryTerms {
    query_tokens: HashSet<String>,
    author_tokens: HashSet<String>,
}

impl QueryTerms {
    pub fn new(query: &str, author: Option<&str>) -> Self {
        Self {
            query_tokens: tokenize(query),
            author_tokens: author.map(tokenize).unwrap_or_default(),
        }
    }

    /// Score one candidate
    pub fn score(&self, candidate: &CandidateBook) -> i32 {
        let title = candidate.title.to_lowercase();
        let title_tokens = tokenize(&title);

        let title_score: i32 = self
            .query_tokens
            .iter()
            .map(|token| {
                if title_tokens.contains(token) {
                    EXACT_TOKEN_WEIGHT
                } else if title.contains(token.as_str()) {
                    SUBSTRING_WEIGHT
                } else {
                    0
                }
            })
            .sum();

        let author_score = if self.author_tokens.is_empty() {
            0
        } else {
            let author_line = candidate.author_line().to_lowercase();
            let hits = self
                .author_tokens
                .iter()
                .filter(|token| author_line.contains(token.as_str()))
                .count();
            AUTHOR_TOKEN_WEIGHT * hits as i32
        };

        let bonus = if self.query_tokens.is_subset(&title_tokens) {
            ALL_TOKENS_BONUS
        } else {
            0
        };

        title_score + author_score + bonus
    }
}

/// Score a single candidate against a query and optional author
pub fn score_candidate(query: &str, author: Option<&str>, candidate: &CandidateBook) -> i32 {
    QueryTerms::new(query, author).score(candidate)
}

/// Score every candidate and sort by descending score
///
/// The sort is stable: equal scores keep their input order.
pub fn rank(query: &str, author: Option<&str>, candidates: Vec<CandidateBook>) -> Vec<ScoredCandidate> {
    let terms = QueryTerms::new(query, author);

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| ScoredCandidate {
            score: terms.score(&candidate),
            candidate,
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}
