//! Open Library client (secondary source)
//!
//! Search goes through `search.json`. Identifier lookup is a three-call
//! chain: edition (`/isbn/{id}.json`) → work (description) → authors
//! (names). Only the edition call can fail the lookup; a failed work or
//! author fetch just leaves that field empty.
//!
//! Requests are paced with a token bucket per Open Library's guidance for
//! API clients.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shelf_common::config::SourcesConfig;
use shelf_common::isbn::{canonical_identifier, normalize_identifier, IdentifierKind};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::SourceError;
use crate::services::transport::{build_http_client, get_json, get_json_optional, non_empty};
use crate::types::{CandidateBook, CatalogSource, CatalogSourceKind};

const COVERS_BASE_URL: &str = "https://covers.openlibrary.org/b/id";
const SEARCH_FIELDS: &str =
    "title,author_name,publisher,first_publish_year,number_of_pages_median,isbn,cover_i";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    publisher: Vec<String>,
    first_publish_year: Option<i32>,
    number_of_pages_median: Option<u32>,
    #[serde(default)]
    isbn: Vec<String>,
    cover_i: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Edition {
    title: Option<String>,
    #[serde(default)]
    publishers: Vec<String>,
    publish_date: Option<String>,
    number_of_pages: Option<u32>,
    #[serde(default)]
    isbn_13: Vec<String>,
    #[serde(default)]
    isbn_10: Vec<String>,
    #[serde(default)]
    covers: Vec<i64>,
    #[serde(default)]
    works: Vec<KeyRef>,
    #[serde(default)]
    authors: Vec<KeyRef>,
    description: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct KeyRef {
    key: String,
}

/// Open Library text fields are either a bare string or `{type, value}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextValue {
    Plain(String),
    Typed { value: String },
}

impl TextValue {
    fn into_string(self) -> String {
        match self {
            TextValue::Plain(text) => text,
            TextValue::Typed { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Work {
    description: Option<TextValue>,
    #[serde(default)]
    authors: Vec<WorkAuthor>,
}

#[derive(Debug, Deserialize)]
struct WorkAuthor {
    author: KeyRef,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<String>,
    personal_name: Option<String>,
}

/// First ISBN-13, else first ISBN-10 upgraded to 13 digits
fn pick_isbn<'a, I>(isbns: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String> + Clone,
{
    let isbn13 = isbns
        .clone()
        .into_iter()
        .map(|raw| normalize_identifier(raw))
        .find(|id| IdentifierKind::classify(id) == IdentifierKind::Isbn13);
    if isbn13.is_some() {
        return isbn13;
    }

    isbns
        .into_iter()
        .map(|raw| normalize_identifier(raw))
        .find(|id| IdentifierKind::classify(id) == IdentifierKind::Isbn10)
        .map(|id| canonical_identifier(&id))
}

fn cover_url(cover_id: i64) -> Option<String> {
    (cover_id > 0).then(|| format!("{}/{}-L.jpg", COVERS_BASE_URL, cover_id))
}

fn doc_to_candidate(doc: SearchDoc) -> Option<CandidateBook> {
    let identifier = pick_isbn(&doc.isbn)?;

    Some(CandidateBook {
        identifier,
        title: non_empty(doc.title).unwrap_or_else(|| "Untitled".to_string()),
        authors: doc.author_name,
        publisher: non_empty(doc.publisher.into_iter().next()),
        published_date: doc.first_publish_year.map(|y| y.to_string()),
        page_count: doc.number_of_pages_median.filter(|p| *p > 0),
        description: None,
        cover_image_url: doc.cover_i.and_then(cover_url),
        source: CatalogSourceKind::OpenLibrary,
    })
}

/// Open Library search and edition lookup client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    base_url: String,
    max_results: u32,
    rate_limiter: DefaultDirectRateLimiter,
}

impl OpenLibraryClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_results: u32,
        requests_per_second: u32,
    ) -> Result<Self, SourceError> {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results: max_results.max(1),
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    /// Client from the `[sources]` config section
    pub fn from_config(config: &SourcesConfig) -> Result<Self, SourceError> {
        Self::new(
            config.open_library_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_results,
            config.open_library_requests_per_second,
        )
    }

    async fn search(&self, params: &[(&str, &str)]) -> Result<Vec<CandidateBook>, SourceError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/search.json", self.base_url);
        let limit = self.max_results.to_string();

        tracing::debug!(url = %url, params = ?params, "Querying Open Library search");

        let response: SearchResponse = get_json(
            self.http_client
                .get(&url)
                .query(params)
                .query(&[("limit", limit.as_str()), ("fields", SEARCH_FIELDS)]),
            "Open Library",
        )
        .await?;

        let total = response.docs.len();
        let candidates: Vec<CandidateBook> = response
            .docs
            .into_iter()
            .filter_map(doc_to_candidate)
            .collect();

        tracing::info!(
            returned = total,
            kept = candidates.len(),
            "Open Library search complete"
        );

        Ok(candidates)
    }

    /// Fetch a keyed sub-resource (`/works/..`, `/authors/..`); failures are tolerated
    async fn fetch_sub<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.rate_limiter.until_ready().await;

        let key = key.trim_start_matches('/');
        let url = format!("{}/{}.json", self.base_url, key);

        match get_json_optional(self.http_client.get(&url), "Open Library").await {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                tracing::debug!(key = %key, "Open Library sub-resource missing");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Open Library sub-fetch failed, field omitted");
                None
            }
        }
    }

    async fn lookup_edition(&self, identifier: &str) -> Result<Vec<CandidateBook>, SourceError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/isbn/{}.json", self.base_url, identifier);
        tracing::debug!(url = %url, "Looking up Open Library edition");

        let edition: Option<Edition> =
            get_json_optional(self.http_client.get(&url), "Open Library").await?;

        let Some(edition) = edition else {
            return Ok(Vec::new());
        };

        let Some(canonical) = pick_isbn(edition.isbn_13.iter().chain(edition.isbn_10.iter())) else {
            tracing::debug!(identifier = %identifier, "Edition has no ISBN, dropping");
            return Ok(Vec::new());
        };

        let work: Option<Work> = match edition.works.first() {
            Some(work_ref) => self.fetch_sub(&work_ref.key).await,
            None => None,
        };

        let mut author_keys: Vec<String> = edition.authors.iter().map(|a| a.key.clone()).collect();
        let mut description = edition.description.map(TextValue::into_string);

        if let Some(work) = work {
            if description.is_none() {
                description = work.description.map(TextValue::into_string);
            }
            if author_keys.is_empty() {
                author_keys = work.authors.into_iter().map(|a| a.author.key).collect();
            }
        }

        let mut authors = Vec::with_capacity(author_keys.len());
        for key in &author_keys {
            if let Some(author) = self.fetch_sub::<Author>(key).await {
                if let Some(name) = non_empty(author.name).or(non_empty(author.personal_name)) {
                    authors.push(name);
                }
            }
        }

        let candidate = CandidateBook {
            identifier: canonical,
            title: non_empty(edition.title).unwrap_or_else(|| "Untitled".to_string()),
            authors,
            publisher: non_empty(edition.publishers.into_iter().next()),
            published_date: non_empty(edition.publish_date),
            page_count: edition.number_of_pages.filter(|p| *p > 0),
            description: non_empty(description),
            cover_image_url: edition.covers.into_iter().find_map(cover_url),
            source: CatalogSourceKind::OpenLibrary,
        };

        tracing::info!(
            identifier = %candidate.identifier,
            title = %candidate.title,
            "Retrieved edition from Open Library"
        );

        Ok(vec![candidate])
    }
}

#[async_trait::async_trait]
impl CatalogSource for OpenLibraryClient {
    fn kind(&self) -> CatalogSourceKind {
        CatalogSourceKind::OpenLibrary
    }

    async fn search_by_query(&self, query: &str) -> Result<Vec<CandidateBook>, SourceError> {
        self.search(&[("q", query)]).await
    }

    async fn search_by_title_author(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Vec<CandidateBook>, SourceError> {
        self.search(&[("title", title), ("author", author)]).await
    }

    async fn search_by_author(&self, author: &str) -> Result<Vec<CandidateBook>, SourceError> {
        self.search(&[("author", author)]).await
    }

    async fn search_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Vec<CandidateBook>, SourceError> {
        self.lookup_edition(&normalize_identifier(identifier)).await
    }
}
