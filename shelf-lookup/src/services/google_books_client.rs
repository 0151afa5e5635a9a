//! Google Books API client (primary source)
//!
//! Volumes search: `GET {base}/volumes?q=...` with `intitle:`, `inauthor:`
//! and `isbn:` qualifiers. Volumes with no ISBN are dropped. A multi-word
//! qualifier value is quoted so the qualifier covers the whole phrase.

use serde::Deserialize;
use shelf_common::config::SourcesConfig;
use shelf_common::isbn::{canonical_identifier, normalize_identifier};
use std::time::Duration;

use crate::error::SourceError;
use crate::services::transport::{build_http_client, get_json, non_empty, secure_url};
use crate::types::{CandidateBook, CatalogSource, CatalogSourceKind};

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    publisher: Option<String>,
    published_date: Option<String>,
    page_count: Option<u32>,
    description: Option<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    extra_large: Option<String>,
    large: Option<String>,
    medium: Option<String>,
    small: Option<String>,
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

impl ImageLinks {
    /// Largest available link, HTTPS, without the page-curl effect
    fn best(&self) -> Option<String> {
        [
            &self.extra_large,
            &self.large,
            &self.medium,
            &self.small,
            &self.thumbnail,
            &self.small_thumbnail,
        ]
        .into_iter()
        .flatten()
        .next()
        .map(|url| secure_url(url).replace("&edge=curl", ""))
    }
}

/// Pick ISBN-13 over ISBN-10; anything else is not an identifier we keep
fn pick_identifier(identifiers: &[IndustryIdentifier]) -> Option<String> {
    let by_kind = |kind: &str| {
        identifiers
            .iter()
            .find(|id| id.kind == kind)
            .map(|id| id.identifier.as_str())
    };

    if let Some(isbn13) = by_kind("ISBN_13") {
        let normalized = normalize_identifier(isbn13);
        if !normalized.is_empty() {
            return Some(normalized);
        }
    }

    by_kind("ISBN_10")
        .map(canonical_identifier)
        .filter(|id| !id.is_empty())
}

fn volume_to_candidate(volume: Volume) -> Option<CandidateBook> {
    let info = volume.volume_info;
    let identifier = pick_identifier(&info.industry_identifiers)?;

    Some(CandidateBook {
        identifier,
        title: non_empty(info.title).unwrap_or_else(|| "Untitled".to_string()),
        authors: info.authors,
        publisher: non_empty(info.publisher),
        published_date: non_empty(info.published_date),
        page_count: info.page_count.filter(|p| *p > 0),
        description: non_empty(info.description),
        cover_image_url: info.image_links.as_ref().and_then(ImageLinks::best),
        source: CatalogSourceKind::GoogleBooks,
    })
}

/// Google Books volumes API client
pub struct GoogleBooksClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_results: u32,
}

impl GoogleBooksClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        max_results: u32,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            // API caps maxResults at 40
            max_results: max_results.clamp(1, 40),
        })
    }

    /// Client from the `[sources]` config section
    pub fn from_config(config: &SourcesConfig, api_key: Option<String>) -> Result<Self, SourceError> {
        Self::new(
            config.google_books_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
            config.max_results,
        )
    }

    async fn volumes(&self, q: &str) -> Result<Vec<CandidateBook>, SourceError> {
        let url = format!("{}/volumes", self.base_url);
        let max_results = self.max_results.to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("q", q),
            ("maxResults", max_results.as_str()),
            ("printType", "books"),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }

        tracing::debug!(url = %url, q = %q, "Querying Google Books");

        let response: VolumesResponse =
            get_json(self.http_client.get(&url).query(&params), "Google Books").await?;

        let total = response.items.len();
        let candidates: Vec<CandidateBook> = response
            .items
            .into_iter()
            .filter_map(volume_to_candidate)
            .collect();

        tracing::info!(
            q = %q,
            returned = total,
            kept = candidates.len(),
            "Google Books search complete"
        );

        Ok(candidates)
    }
}

/// `prefix:value`, quoting `value` when it has more than one word
fn qualified(prefix: &str, value: &str) -> String {
    let value = value.trim().replace('"', "");
    if value.split_whitespace().nth(1).is_some() {
        format!("{}:\"{}\"", prefix, value)
    } else {
        format!("{}:{}", prefix, value)
    }
}

#[async_trait::async_trait]
impl CatalogSource for GoogleBooksClient {
    fn kind(&self) -> CatalogSourceKind {
        CatalogSourceKind::GoogleBooks
    }

    async fn search_by_query(&self, query: &str) -> Result<Vec<CandidateBook>, SourceError> {
        self.volumes(query).await
    }

    async fn search_by_title_author(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Vec<CandidateBook>, SourceError> {
        let q = format!("{} {}", qualified("intitle", title), qualified("inauthor", author));
        self.volumes(&q).await
    }

    async fn search_by_author(&self, author: &str) -> Result<Vec<CandidateBook>, SourceError> {
        self.volumes(&qualified("inauthor", author)).await
    }

    async fn search_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Vec<CandidateBook>, SourceError> {
        self.volumes(&format!("isbn:{}", normalize_identifier(identifier)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_quotes_phrases() {
        assert_eq!(qualified("intitle", "dune"), "intitle:dune");
        assert_eq!(qualified("intitle", " left hand "), "intitle:\"left hand\"");
        assert_eq!(qualified("inauthor", "Ursula K. Le Guin"), "inauthor:\"Ursula K. Le Guin\"");
        // stray quotes cannot break out of the phrase
        assert_eq!(qualified("intitle", "a \"b\" c"), "intitle:\"a b c\"");
    }

    const SAMPLE: &str = r#"{
        "kind": "books#volumes",
        "totalItems": 3,
        "items": [
            {
                "id": "a1",
                "volumeInfo": {
                    "title": "Sapiens",
                    "subtitle": "A Brief History of Humankind",
                    "authors": ["Yuval Noah Harari"],
                    "publisher": "Harper",
                    "publishedDate": "2015-02-10",
                    "pageCount": 464,
                    "description": "From a renowned historian...",
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "0062316117"},
                        {"type": "ISBN_13", "identifier": "9780062316110"}
                    ],
                    "imageLinks": {
                        "smallThumbnail": "http://books.google.com/books/content?id=a1&zoom=5&edge=curl",
                        "thumbnail": "http://books.google.com/books/content?id=a1&zoom=1&edge=curl"
                    }
                }
            },
            {
                "id": "a2",
                "volumeInfo": {
                    "title": "Sapiens Study Notes",
                    "industryIdentifiers": [{"type": "OTHER", "identifier": "UOM:39015"}]
                }
            },
            {
                "id": "a3",
                "volumeInfo": {
                    "title": "The Old Edition",
                    "industryIdentifiers": [{"type": "ISBN_10", "identifier": "0-306-40615-2"}],
                    "pageCount": 0
                }
            }
        ]
    }"#;

    fn parse(body: &str) -> Vec<CandidateBook> {
        let response: VolumesResponse = serde_json::from_str(body).unwrap();
        response.items.into_iter().filter_map(volume_to_candidate).collect()
    }

    #[test]
    fn test_maps_volume_fields() {
        let candidates = parse(SAMPLE);
        let sapiens = &candidates[0];
        assert_eq!(sapiens.identifier, "9780062316110");
        assert_eq!(sapiens.title, "Sapiens");
        assert_eq!(sapiens.authors, vec!["Yuval Noah Harari".to_string()]);
        assert_eq!(sapiens.publisher.as_deref(), Some("Harper"));
        assert_eq!(sapiens.published_date.as_deref(), Some("2015-02-10"));
        assert_eq!(sapiens.page_count, Some(464));
        assert_eq!(sapiens.source, CatalogSourceKind::GoogleBooks);
    }

    #[test]
    fn test_prefers_largest_cover_over_https() {
        let candidates = parse(SAMPLE);
        assert_eq!(
            candidates[0].cover_image_url.as_deref(),
            Some("https://books.google.com/books/content?id=a1&zoom=1")
        );
    }

    #[test]
    fn test_drops_volume_without_isbn() {
        let candidates = parse(SAMPLE);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.title != "Sapiens Study Notes"));
    }

    #[test]
    fn test_isbn10_only_is_upgraded_and_zero_pages_dropped() {
        let candidates = parse(SAMPLE);
        let old = &candidates[1];
        assert_eq!(old.identifier, "9780306406157");
        assert_eq!(old.page_count, None);
        assert_eq!(old.cover_image_url, None);
    }

    #[test]
    fn test_empty_response_has_no_items() {
        assert!(parse(r#"{"kind": "books#volumes", "totalItems": 0}"#).is_empty());
    }

    #[test]
    fn test_unexpected_shape_is_parse_error() {
        let result: Result<VolumesResponse, _> = serde_json::from_str(r#"{"items": "nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_max_results_is_clamped() {
        let client = GoogleBooksClient::new("https://example.test/", None, Duration::from_secs(1), 500).unwrap();
        assert_eq!(client.max_results, 40);
        assert_eq!(client.base_url, "https://example.test");
    }
}
