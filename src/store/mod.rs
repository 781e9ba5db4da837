//! Storage abstraction for keywords and ranking history.
//!
//! The [`Store`] trait is the record store behind the ranking check, the
//! CLI, and the HTTP API. Two backends are provided:
//!
//! - [`SqliteStore`] — durable storage on the configured SQLite database.
//! - [`InMemoryStore`] — `RwLock`-guarded vectors, for tests.
//!
//! Implementations must be `Send + Sync` so they can sit behind an
//! `Arc<dyn Store>` in the server state.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Keyword, KeywordSummary, NewKeyword, NewRanking, Ranking};

/// Message used when a keyword with the same text already exists.
pub const DUPLICATE_KEYWORD: &str = "Keyword already exists";

/// Abstract record store.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_keywords`](Store::list_keywords) | All keywords, in creation order |
/// | [`list_keyword_summaries`](Store::list_keyword_summaries) | Keywords with their latest ranking |
/// | [`find_keyword_by_text`](Store::find_keyword_by_text) | Exact, case-sensitive lookup |
/// | [`create_keyword`](Store::create_keyword) | Insert; duplicates are a validation error |
/// | [`delete_keyword`](Store::delete_keyword) | Remove a keyword and its rankings |
/// | [`create_ranking`](Store::create_ranking) | Append one observation |
/// | [`ranking_history`](Store::ranking_history) | Most recent rankings, oldest first |
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_keywords(&self) -> Result<Vec<Keyword>>;

    async fn list_keyword_summaries(&self) -> Result<Vec<KeywordSummary>>;

    async fn find_keyword_by_text(&self, keyword: &str) -> Result<Option<Keyword>>;

    /// Insert a keyword.
    ///
    /// Fails with [`Error::Validation`](crate::error::Error::Validation) if
    /// the text is already tracked.
    async fn create_keyword(&self, keyword: NewKeyword) -> Result<Keyword>;

    /// Returns `false` when no keyword has this id.
    async fn delete_keyword(&self, id: &str) -> Result<bool>;

    async fn create_ranking(&self, ranking: NewRanking) -> Result<Ranking>;

    /// The `limit` most recent rankings for a keyword, in ascending
    /// `checked_at` order. Ties keep insertion order.
    async fn ranking_history(&self, keyword_id: &str, limit: i64) -> Result<Vec<Ranking>>;
}
