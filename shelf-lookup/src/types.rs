//! Core types and the catalog source trait
//!
//! Every catalog client implements [`CatalogSource`] so the resolver can run
//! its fallback steps against any source the same way, and tests can swap in
//! scripted sources.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelf_common::models::{ReadStatus, TrackedBook};

use crate::error::SourceError;

/// Which catalog produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSourceKind {
    GoogleBooks,
    OpenLibrary,
}

impl CatalogSourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogSourceKind::GoogleBooks => "Google Books",
            CatalogSourceKind::OpenLibrary => "Open Library",
        }
    }
}

/// Provisional book record from a metadata search
///
/// Lives for one resolution call. The caller either accepts it (see
/// [`CandidateBook::into_tracked`]) or drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateBook {
    /// Normalized identifier, ISBN-13 preferred; dedup key
    pub identifier: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    /// Free-text year or date as the source reports it
    pub published_date: Option<String>,
    pub page_count: Option<u32>,
    pub description: Option<String>,
    /// HTTPS cover URL
    pub cover_image_url: Option<String>,
    pub source: CatalogSourceKind,
}

impl CandidateBook {
    /// Minimal candidate, remaining fields empty
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        source: CatalogSourceKind,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            authors: Vec::new(),
            publisher: None,
            published_date: None,
            page_count: None,
            description: None,
            cover_image_url: None,
            source,
        }
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Authors joined for display and author matching
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Accept the candidate into the library as a not-started book
    pub fn into_tracked(self) -> TrackedBook {
        let mut book = TrackedBook::new(self.identifier, self.title);
        book.authors = self.authors;
        book.page_count = self.page_count;
        book
    }

    /// Accept the candidate and immediately mark it with a status
    pub fn into_tracked_with_status(self, status: ReadStatus, on: NaiveDate) -> TrackedBook {
        self.into_tracked().transition_to(status, on)
    }
}

/// Candidate with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub score: i32,
    #[serde(flatten)]
    pub candidate: CandidateBook,
}

/// A catalog API the resolver can query
///
/// Results come back in source order; ranking happens in the resolver.
/// An empty `Vec` means the source answered with no matches, which is not
/// an error. Implementations must never emit a candidate without an
/// identifier.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    fn kind(&self) -> CatalogSourceKind;

    /// Free-text search
    async fn search_by_query(&self, query: &str) -> Result<Vec<CandidateBook>, SourceError>;

    /// Search restricted to a title and an author
    async fn search_by_title_author(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Vec<CandidateBook>, SourceError>;

    /// Everything credited to an author
    async fn search_by_author(&self, author: &str) -> Result<Vec<CandidateBook>, SourceError>;

    /// Lookup by normalized identifier
    async fn search_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Vec<CandidateBook>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_tracked_copies_metadata() {
        let mut candidate = CandidateBook::new("9780062316110", "Sapiens", CatalogSourceKind::GoogleBooks)
            .with_authors(["Yuval Noah Harari"]);
        candidate.page_count = Some(464);

        let book = candidate.into_tracked();
        assert_eq!(book.identifier, "9780062316110");
        assert_eq!(book.authors, vec!["Yuval Noah Harari".to_string()]);
        assert_eq!(book.page_count, Some(464));
        assert_eq!(book.status, ReadStatus::NotStarted);
    }

    #[test]
    fn test_into_tracked_with_status() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let book = CandidateBook::new("1", "A", CatalogSourceKind::OpenLibrary)
            .into_tracked_with_status(ReadStatus::InProgress, day);
        assert_eq!(book.started_on, Some(day));
    }

    #[test]
    fn test_author_line() {
        let candidate = CandidateBook::new("1", "Good Omens", CatalogSourceKind::OpenLibrary)
            .with_authors(["Terry Pratchett", "Neil Gaiman"]);
        assert_eq!(candidate.author_line(), "Terry Pratchett, Neil Gaiman");
    }
}
