//! Search API client.
//!
//! Defines the [`SearchClient`] trait used by the ranking check and the
//! [`GoogleSearchClient`] implementation backed by the Google Custom Search
//! JSON API.
//!
//! # Request
//!
//! ```text
//! GET {endpoint}?key=<api key>&cx=<engine id>&q=<keyword>&num=10
//! ```
//!
//! # Failure modes
//!
//! - API key or engine id missing → [`Error::ConfigurationMissing`], no
//!   request is sent.
//! - Transport error, non-2xx status, or undecodable body →
//!   [`Error::SearchRequestFailed`].
//!
//! There is no retry or caching here; the caller decides what to do with a
//! failure.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::models::SearchResult;

/// Number of results requested per search, and the upper bound on what
/// [`SearchClient::search`] returns.
pub const RESULT_PAGE_SIZE: usize = 10;

/// A source of ranked search results for a keyword.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Returns at most [`RESULT_PAGE_SIZE`] results, positions `1..=N` in
    /// response order.
    async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>>;
}

/// Client for the Google Custom Search JSON API.
pub struct GoogleSearchClient {
    endpoint: String,
    api_key: Option<String>,
    engine_id: Option<String>,
    http: reqwest::Client,
}

impl GoogleSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        engine_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::SearchRequestFailed(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            engine_id,
            http,
        })
    }

    /// Build a client from configuration, reading the credentials from
    /// `GOOGLE_API_KEY` and `GOOGLE_SEARCH_ENGINE_ID`.
    ///
    /// Missing credentials are not an error here; they surface on the
    /// first [`search`](SearchClient::search) call.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.search.endpoint.clone(),
            config::env_secret(config::API_KEY_ENV),
            config::env_secret(config::ENGINE_ID_ENV),
            Duration::from_secs(config.search.timeout_secs),
        )
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Option<Vec<SearchItem>>,
}

/// One result item. Every field may be absent or `null`; a bad item must
/// not sink the rest of the page.
#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[async_trait]
impl SearchClient for GoogleSearchClient {
    async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>> {
        let (api_key, engine_id) = match (&self.api_key, &self.engine_id) {
            (Some(k), Some(cx)) if !k.is_empty() && !cx.is_empty() => (k, cx),
            _ => return Err(Error::ConfigurationMissing),
        };

        let num = RESULT_PAGE_SIZE.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", engine_id.as_str()),
                ("q", keyword),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                // The request URL carries the API key.
                let e = e.without_url();
                tracing::warn!(keyword, error = %e, "search request failed");
                Error::SearchRequestFailed(e.to_string())
            })?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::SearchRequestFailed(e.without_url().to_string()))?;

        Ok(into_results(body))
    }
}

/// Items without a link are dropped but still occupy their rank, so the
/// positions of the remaining results match the response order.
fn into_results(body: SearchResponse) -> Vec<SearchResult> {
    body.items
        .unwrap_or_default()
        .into_iter()
        .take(RESULT_PAGE_SIZE)
        .enumerate()
        .filter_map(|(i, item)| {
            Some(SearchResult {
                position: i as u32 + 1,
                url: item.link?,
                title: item.title.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn_endpoint(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/customsearch/v1", addr)
    }

    fn client(endpoint: &str) -> GoogleSearchClient {
        GoogleSearchClient::new(
            endpoint,
            Some("test-key".to_string()),
            Some("test-cx".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_into_results_assigns_positions_and_defaults_snippet() {
        let body: SearchResponse = serde_json::from_value(json!({
            "items": [
                { "link": "https://a.com/", "title": "A", "snippet": "first" },
                { "link": "https://b.com/", "title": "B" }
            ]
        }))
        .unwrap();
        let results = into_results(body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].position, 1);
        assert_eq!(results[0].snippet, "first");
        assert_eq!(results[1].position, 2);
        assert_eq!(results[1].url, "https://b.com/");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_missing_items_is_empty() {
        let body: SearchResponse =
            serde_json::from_value(json!({ "kind": "customsearch#search" })).unwrap();
        assert!(into_results(body).is_empty());
    }

    #[test]
    fn test_results_capped_at_page_size() {
        let items: Vec<Value> = (0..15)
            .map(|i| json!({ "link": format!("https://site{}.com/", i), "title": "t" }))
            .collect();
        let body: SearchResponse = serde_json::from_value(json!({ "items": items })).unwrap();
        let results = into_results(body);
        assert_eq!(results.len(), RESULT_PAGE_SIZE);
        assert_eq!(results.last().unwrap().position, 10);
    }

    #[test]
    fn test_null_fields_default_to_empty() {
        let body: SearchResponse = serde_json::from_value(json!({
            "items": [
                { "link": "https://a.com/", "title": "A", "snippet": null },
                { "link": "https://target.com/p", "title": null }
            ]
        }))
        .unwrap();
        let results = into_results(body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "");
        assert_eq!(results[1].title, "");
        assert_eq!(results[1].position, 2);
    }

    #[test]
    fn test_item_without_link_keeps_its_rank() {
        let body: SearchResponse = serde_json::from_value(json!({
            "items": [
                { "title": "no link here" },
                { "link": null, "title": "null link" },
                { "link": "https://target.com/p", "title": "T" }
            ]
        }))
        .unwrap();
        let results = into_results(body);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://target.com/p");
        assert_eq!(results[0].position, 3);
        assert_eq!(
            crate::matcher::find_url_position(&results, "https://target.com/p"),
            Some(3)
        );
    }

    #[test]
    fn test_null_items_is_empty() {
        let body: SearchResponse = serde_json::from_value(json!({ "items": null })).unwrap();
        assert!(into_results(body).is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_request() {
        // Nothing listens on this endpoint; a request would be a different error.
        let c = GoogleSearchClient::new(
            "http://127.0.0.1:9/unused",
            Some("key".to_string()),
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(matches!(c.search("rust").await, Err(Error::ConfigurationMissing)));

        let c = GoogleSearchClient::new(
            "http://127.0.0.1:9/unused",
            Some(String::new()),
            Some("cx".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(matches!(c.search("rust").await, Err(Error::ConfigurationMissing)));
    }

    #[tokio::test]
    async fn test_search_sends_query_and_parses_items() {
        let app = Router::new().route(
            "/customsearch/v1",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("key").map(String::as_str), Some("test-key"));
                assert_eq!(params.get("cx").map(String::as_str), Some("test-cx"));
                assert_eq!(params.get("num").map(String::as_str), Some("10"));
                let q = params.get("q").cloned().unwrap_or_default();
                Json(json!({
                    "items": [
                        { "link": "https://example.com/a", "title": format!("{} one", q), "snippet": "s1" },
                        { "link": "https://example.com/b", "title": "two" }
                    ]
                }))
            }),
        );
        let endpoint = spawn_endpoint(app).await;

        let results = client(&endpoint).search("rust web").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "rust web one");
        assert_eq!(results[1].position, 2);
        assert_eq!(results[1].snippet, "");
    }

    #[tokio::test]
    async fn test_http_error_status_is_request_failure() {
        let app = Router::new().route(
            "/customsearch/v1",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
        let endpoint = spawn_endpoint(app).await;

        let err = client(&endpoint).search("rust").await.unwrap_err();
        assert!(matches!(err, Error::SearchRequestFailed(_)));
        assert!(err.to_string().starts_with("Failed to fetch search results"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_request_failure() {
        let app = Router::new().route("/customsearch/v1", get(|| async { "<html>oops</html>" }));
        let endpoint = spawn_endpoint(app).await;

        let err = client(&endpoint).search("rust").await.unwrap_err();
        assert!(matches!(err, Error::SearchRequestFailed(_)));
    }
}
