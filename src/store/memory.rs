//! In-memory [`Store`] implementation for tests.
//!
//! Keywords and rankings live in `Vec`s behind `std::sync::RwLock`, so
//! iteration order is insertion order.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Keyword, KeywordSummary, LatestRanking, NewKeyword, NewRanking, Ranking};

use super::{Store, DUPLICATE_KEYWORD};

/// In-memory store for tests.
pub struct InMemoryStore {
    keywords: RwLock<Vec<Keyword>>,
    rankings: RwLock<Vec<Ranking>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            keywords: RwLock::new(Vec::new()),
            rankings: RwLock::new(Vec::new()),
        }
    }

    /// Number of rankings stored across all keywords.
    pub fn ranking_count(&self) -> usize {
        self.rankings.read().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Persistence("in-memory store lock poisoned".to_string())
}

/// Most recent rankings for a keyword, oldest first. `rankings` is in
/// insertion order, which the stable sort preserves for equal timestamps.
fn history_of(rankings: &[Ranking], keyword_id: &str, limit: usize) -> Vec<Ranking> {
    let mut history: Vec<Ranking> = rankings
        .iter()
        .filter(|r| r.keyword_id == keyword_id)
        .cloned()
        .collect();
    history.sort_by_key(|r| r.checked_at);
    let skip = history.len().saturating_sub(limit);
    history.split_off(skip)
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_keywords(&self) -> Result<Vec<Keyword>> {
        Ok(self.keywords.read().map_err(poisoned)?.clone())
    }

    async fn list_keyword_summaries(&self) -> Result<Vec<KeywordSummary>> {
        let keywords = self.keywords.read().map_err(poisoned)?;
        let rankings = self.rankings.read().map_err(poisoned)?;
        Ok(keywords
            .iter()
            .map(|k| KeywordSummary {
                keyword: k.clone(),
                latest_ranking: history_of(&rankings, &k.id, 1).pop().map(|r| LatestRanking {
                    position: r.position,
                    checked_at: r.checked_at,
                }),
            })
            .collect())
    }

    async fn find_keyword_by_text(&self, keyword: &str) -> Result<Option<Keyword>> {
        let keywords = self.keywords.read().map_err(poisoned)?;
        Ok(keywords.iter().find(|k| k.keyword == keyword).cloned())
    }

    async fn create_keyword(&self, keyword: NewKeyword) -> Result<Keyword> {
        let mut keywords = self.keywords.write().map_err(poisoned)?;
        if keywords.iter().any(|k| k.keyword == keyword.keyword) {
            return Err(Error::Validation(DUPLICATE_KEYWORD.to_string()));
        }
        let created = Keyword {
            id: Uuid::new_v4().to_string(),
            keyword: keyword.keyword,
            target_url: keyword.target_url,
            created_at: Utc::now(),
        };
        keywords.push(created.clone());
        Ok(created)
    }

    async fn delete_keyword(&self, id: &str) -> Result<bool> {
        let mut keywords = self.keywords.write().map_err(poisoned)?;
        let before = keywords.len();
        keywords.retain(|k| k.id != id);
        if keywords.len() == before {
            return Ok(false);
        }
        self.rankings
            .write()
            .map_err(poisoned)?
            .retain(|r| r.keyword_id != id);
        Ok(true)
    }

    async fn create_ranking(&self, ranking: NewRanking) -> Result<Ranking> {
        let known = self
            .keywords
            .read()
            .map_err(poisoned)?
            .iter()
            .any(|k| k.id == ranking.keyword_id);
        if !known {
            return Err(Error::Persistence(format!(
                "unknown keyword id: {}",
                ranking.keyword_id
            )));
        }
        let created = Ranking {
            id: Uuid::new_v4().to_string(),
            keyword_id: ranking.keyword_id,
            position: ranking.position,
            url: ranking.url,
            title: ranking.title,
            snippet: ranking.snippet,
            checked_at: ranking.checked_at,
        };
        self.rankings.write().map_err(poisoned)?.push(created.clone());
        Ok(created)
    }

    async fn ranking_history(&self, keyword_id: &str, limit: i64) -> Result<Vec<Ranking>> {
        let rankings = self.rankings.read().map_err(poisoned)?;
        Ok(history_of(&rankings, keyword_id, limit.max(0) as usize))
    }
}
