//! Core data models used throughout the rank tracker.
//!
//! [`Keyword`] and [`Ranking`] are the persisted records. [`SearchResult`]
//! is transient: produced by a search call and consumed by the matcher.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A tracked search phrase and the URL whose position is monitored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    pub id: String,
    pub keyword: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a keyword.
#[derive(Debug, Clone)]
pub struct NewKeyword {
    pub keyword: String,
    pub target_url: String,
}

/// One timestamped observation of a keyword's target URL position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub id: String,
    pub keyword_id: String,
    /// 1-based position; `None` when the URL was not in the result page.
    pub position: Option<u32>,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub checked_at: DateTime<Utc>,
}

/// Input for appending a ranking.
#[derive(Debug, Clone)]
pub struct NewRanking {
    pub keyword_id: String,
    pub position: Option<u32>,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub checked_at: DateTime<Utc>,
}

/// A single entry from a search result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// 1-based rank in the response.
    pub position: u32,
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// The latest ranking shown next to a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestRanking {
    pub position: Option<u32>,
    pub checked_at: DateTime<Utc>,
}

/// A keyword together with its most recent ranking, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordSummary {
    #[serde(flatten)]
    pub keyword: Keyword,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_ranking: Option<LatestRanking>,
}

/// One point of a ranking chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingPoint {
    pub date: DateTime<Utc>,
    pub position: Option<u32>,
}

/// Chart-ready ranking history for one keyword, oldest point first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingSeries {
    pub keyword_id: String,
    pub keyword: String,
    pub data: Vec<RankingPoint>,
}
