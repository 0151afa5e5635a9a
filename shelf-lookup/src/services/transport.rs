//! Shared HTTP plumbing for catalog clients
//!
//! Bodies are read as text and decoded separately so that an unexpected JSON
//! shape always surfaces as `SourceError::Parse`, never as a panic or a raw
//! reqwest error.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::SourceError;

/// Build the HTTP client every catalog source uses
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .user_agent(shelf_common::config::get_user_agent())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .build()
        .map_err(|e| SourceError::Network(e.to_string()))
}

/// Send a request and decode a JSON body
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    source: &str,
) -> Result<T, SourceError> {
    match get_json_optional(request, source).await? {
        Some(body) => Ok(body),
        None => Err(SourceError::Http(
            StatusCode::NOT_FOUND.as_u16(),
            format!("{} returned 404", source),
        )),
    }
}

/// Like [`get_json`], but a 404 is `Ok(None)` rather than an error
pub(crate) async fn get_json_optional<T: DeserializeOwned>(
    request: RequestBuilder,
    source: &str,
) -> Result<Option<T>, SourceError> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        tracing::debug!(source = %source, "Catalog returned 404");
        return Ok(None);
    }

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(SourceError::Http(status.as_u16(), truncate(&error_text, 200)));
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map(Some)
        .map_err(|e| SourceError::Parse(format!("{} response: {}", source, e)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Rewrite a cover link to HTTPS
pub(crate) fn secure_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Trim and drop empty strings
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
