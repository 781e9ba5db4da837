//! Keyword management.
//!
//! Validated create/list/delete operations shared by the `rtrack keyword`
//! commands and the `/api/keywords` endpoints.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Keyword, KeywordSummary, NewKeyword};
use crate::store::{SqliteStore, Store, DUPLICATE_KEYWORD};

/// Start tracking `keyword` for `target_url`.
///
/// Both values must be non-empty and the keyword text must not already be
/// tracked (comparison is case-sensitive). Rejections are
/// [`Error::Validation`] and leave the store untouched.
pub async fn add_keyword(store: &dyn Store, keyword: &str, target_url: &str) -> Result<Keyword> {
    if keyword.is_empty() || target_url.is_empty() {
        return Err(Error::Validation(
            "Keyword and target URL are required".to_string(),
        ));
    }

    if store.find_keyword_by_text(keyword).await?.is_some() {
        return Err(Error::Validation(DUPLICATE_KEYWORD.to_string()));
    }

    let created = store
        .create_keyword(NewKeyword {
            keyword: keyword.to_string(),
            target_url: target_url.to_string(),
        })
        .await?;
    tracing::info!(id = %created.id, keyword = %created.keyword, "keyword added");
    Ok(created)
}

/// Stop tracking a keyword and drop its ranking history.
pub async fn remove_keyword(store: &dyn Store, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::Validation("Keyword ID is required".to_string()));
    }
    if !store.delete_keyword(id).await? {
        return Err(Error::NotFound(format!("keyword not found: {}", id)));
    }
    tracing::info!(id, "keyword removed");
    Ok(())
}

pub async fn list_keywords(store: &dyn Store) -> Result<Vec<KeywordSummary>> {
    store.list_keyword_summaries().await
}

// ============ CLI entry points ============

pub async fn run_add(config: &Config, keyword: &str, target_url: &str) -> anyhow::Result<()> {
    let store = SqliteStore::connect(config).await?;
    let created = add_keyword(&store, keyword, target_url).await;
    store.close().await;
    let created = created?;
    println!("Added keyword '{}' ({})", created.keyword, created.id);
    Ok(())
}

pub async fn run_remove(config: &Config, id: &str) -> anyhow::Result<()> {
    let store = SqliteStore::connect(config).await?;
    let removed = remove_keyword(&store, id).await;
    store.close().await;
    removed?;
    println!("Removed keyword {}", id);
    Ok(())
}

pub async fn run_list(config: &Config) -> anyhow::Result<()> {
    let store = SqliteStore::connect(config).await?;
    let summaries = list_keywords(&store).await;
    store.close().await;
    let summaries = summaries?;

    if summaries.is_empty() {
        println!("No keywords tracked.");
        return Ok(());
    }

    for s in &summaries {
        let latest = match &s.latest_ranking {
            Some(r) => match r.position {
                Some(p) => format!("#{} at {}", p, r.checked_at.format("%Y-%m-%d %H:%M")),
                None => format!("not ranked at {}", r.checked_at.format("%Y-%m-%d %H:%M")),
            },
            None => "never checked".to_string(),
        };
        println!("{}  {}", s.keyword.id, s.keyword.keyword);
        println!("    target: {}", s.keyword.target_url);
        println!("    latest: {}", latest);
    }

    Ok(())
}
