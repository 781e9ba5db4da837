//! Ranking check batch job.
//!
//! Walks every tracked keyword in store order, searches for it, locates
//! the keyword's target URL in the result page, and appends a ranking when
//! the URL is found. Each keyword produces exactly one [`KeywordOutcome`];
//! a failure on one keyword is recorded and the batch moves on.
//!
//! Keywords are processed strictly one after another with a fixed pause
//! between them, which bounds the outbound request rate.
//!
//! Only a failure to read the keyword list aborts the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::matcher::find_url_position;
use crate::models::{Keyword, NewRanking};
use crate::search::{GoogleSearchClient, SearchClient};
use crate::store::{SqliteStore, Store};

/// Message attached to keywords whose URL is not on the result page.
pub const NOT_FOUND_MESSAGE: &str = "URL not found in top 10 results";

/// Result of checking one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Target URL found; a ranking was stored.
    Ranked { position: u32 },
    /// Target URL absent from the result page; nothing stored. `position`
    /// is always `None` and serializes as `null`.
    NotRanked {
        position: Option<u32>,
        message: String,
    },
    /// Search or persistence failed.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordOutcome {
    pub keyword_id: String,
    pub keyword: String,
    pub success: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl KeywordOutcome {
    fn new(keyword: &Keyword, outcome: Outcome) -> Self {
        Self {
            keyword_id: keyword.id.clone(),
            keyword: keyword.keyword.clone(),
            success: !matches!(outcome, Outcome::Failed { .. }),
            outcome,
        }
    }
}

/// Summary of one batch run, in keyword order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub message: String,
    pub checked_at: DateTime<Utc>,
    pub ranked: usize,
    pub not_ranked: usize,
    pub failed: usize,
    pub results: Vec<KeywordOutcome>,
}

impl CheckReport {
    fn from_outcomes(message: &str, results: Vec<KeywordOutcome>) -> Self {
        let count = |pred: fn(&Outcome) -> bool| results.iter().filter(|r| pred(&r.outcome)).count();
        Self {
            message: message.to_string(),
            checked_at: Utc::now(),
            ranked: count(|o| matches!(o, Outcome::Ranked { .. })),
            not_ranked: count(|o| matches!(o, Outcome::NotRanked { .. })),
            failed: count(|o| matches!(o, Outcome::Failed { .. })),
            results,
        }
    }
}

/// Run the ranking check over every keyword in `store`.
///
/// `delay` is slept between consecutive keywords, whether the previous one
/// succeeded or not. Per-keyword errors become [`Outcome::Failed`]; only a
/// failure to list keywords is returned as `Err`.
pub async fn run_check(
    store: &dyn Store,
    client: &dyn SearchClient,
    delay: Duration,
) -> Result<CheckReport> {
    let keywords = store.list_keywords().await?;

    if keywords.is_empty() {
        tracing::info!("no keywords to check");
        return Ok(CheckReport::from_outcomes("No keywords to check", Vec::new()));
    }

    tracing::info!(count = keywords.len(), "starting ranking check");

    let mut results = Vec::with_capacity(keywords.len());
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = match check_keyword(store, client, keyword).await {
            Ok(Some(position)) => {
                tracing::info!(keyword = %keyword.keyword, position, "ranked");
                Outcome::Ranked { position }
            }
            Ok(None) => {
                tracing::info!(keyword = %keyword.keyword, "not in top results");
                Outcome::NotRanked {
                    position: None,
                    message: NOT_FOUND_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(keyword = %keyword.keyword, error = %e, "keyword check failed");
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        results.push(KeywordOutcome::new(keyword, outcome));
    }

    let report = CheckReport::from_outcomes("Ranking check completed", results);
    tracing::info!(
        ranked = report.ranked,
        not_ranked = report.not_ranked,
        failed = report.failed,
        "ranking check completed"
    );
    Ok(report)
}

/// Search, match, and persist for a single keyword.
async fn check_keyword(
    store: &dyn Store,
    client: &dyn SearchClient,
    keyword: &Keyword,
) -> Result<Option<u32>> {
    let results = client.search(&keyword.keyword).await?;

    let Some(position) = find_url_position(&results, &keyword.target_url) else {
        return Ok(None);
    };

    let matched = results.iter().find(|r| r.position == position);
    store
        .create_ranking(NewRanking {
            keyword_id: keyword.id.clone(),
            position: Some(position),
            url: keyword.target_url.clone(),
            title: matched.map(|r| r.title.clone()).unwrap_or_default(),
            snippet: matched.map(|r| r.snippet.clone()).unwrap_or_default(),
            checked_at: Utc::now(),
        })
        .await?;

    Ok(Some(position))
}

/// CLI entry point: run the check against the configured database and
/// search API, then print the report.
pub async fn run_check_cmd(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = SqliteStore::connect(config).await?;
    let client = GoogleSearchClient::from_config(config)?;

    let report = run_check(&store, &client, config.check.delay()).await?;
    store.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.message);
    for r in &report.results {
        match &r.outcome {
            Outcome::Ranked { position } => println!("  {:<40} #{}", r.keyword, position),
            Outcome::NotRanked { message, .. } => println!("  {:<40} - ({})", r.keyword, message),
            Outcome::Failed { error } => println!("  {:<40} error: {}", r.keyword, error),
        }
    }
    println!(
        "ranked: {}  not ranked: {}  failed: {}",
        report.ranked, report.not_ranked, report.failed
    );

    Ok(())
}
