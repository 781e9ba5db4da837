//! SQLite-backed [`Store`] implementation.
//!
//! Timestamps are stored as Unix milliseconds. `rowid` breaks ties so
//! that rows written in the same millisecond keep their insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::error::{Error, Result};
use crate::migrate;
use crate::models::{Keyword, KeywordSummary, LatestRanking, NewKeyword, NewRanking, Ranking};

use super::{Store, DUPLICATE_KEYWORD};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the configured database, creating the schema if needed.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| Error::Persistence(format!("timestamp out of range: {}", ms)))
}

/// Drop sub-millisecond precision so returned values equal what a later read
/// produces.
fn to_stored_precision(at: DateTime<Utc>) -> Result<DateTime<Utc>> {
    from_millis(at.timestamp_millis())
}

fn position_from_db(value: Option<i64>) -> Result<Option<u32>> {
    value
        .map(|p| u32::try_from(p).map_err(|_| Error::Persistence(format!("invalid position: {}", p))))
        .transpose()
}

fn row_to_keyword(row: &SqliteRow) -> Result<Keyword> {
    Ok(Keyword {
        id: row.try_get("id")?,
        keyword: row.try_get("keyword")?,
        target_url: row.try_get("target_url")?,
        created_at: from_millis(row.try_get("created_at")?)?,
    })
}

fn row_to_ranking(row: &SqliteRow) -> Result<Ranking> {
    Ok(Ranking {
        id: row.try_get("id")?,
        keyword_id: row.try_get("keyword_id")?,
        position: position_from_db(row.try_get("position")?)?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        snippet: row.try_get("snippet")?,
        checked_at: from_millis(row.try_get("checked_at")?)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_keywords(&self) -> Result<Vec<Keyword>> {
        let rows = sqlx::query(
            "SELECT id, keyword, target_url, created_at FROM keywords ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_keyword).collect()
    }

    async fn list_keyword_summaries(&self) -> Result<Vec<KeywordSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT k.id, k.keyword, k.target_url, k.created_at,
                   r.position AS latest_position,
                   r.checked_at AS latest_checked_at
            FROM keywords k
            LEFT JOIN rankings r ON r.id = (
                SELECT r2.id FROM rankings r2
                WHERE r2.keyword_id = k.id
                ORDER BY r2.checked_at DESC, r2.rowid DESC
                LIMIT 1
            )
            ORDER BY k.created_at ASC, k.rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<KeywordSummary> {
                let checked_at: Option<i64> = row.try_get("latest_checked_at")?;
                let latest_ranking = match checked_at {
                    Some(ms) => Some(LatestRanking {
                        position: position_from_db(row.try_get("latest_position")?)?,
                        checked_at: from_millis(ms)?,
                    }),
                    None => None,
                };
                Ok(KeywordSummary {
                    keyword: row_to_keyword(row)?,
                    latest_ranking,
                })
            })
            .collect()
    }

    async fn find_keyword_by_text(&self, keyword: &str) -> Result<Option<Keyword>> {
        let row = sqlx::query(
            "SELECT id, keyword, target_url, created_at FROM keywords WHERE keyword = ?",
        )
        .bind(keyword)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_keyword).transpose()
    }

    async fn create_keyword(&self, keyword: NewKeyword) -> Result<Keyword> {
        let created = Keyword {
            id: Uuid::new_v4().to_string(),
            keyword: keyword.keyword,
            target_url: keyword.target_url,
            created_at: to_stored_precision(Utc::now())?,
        };

        let inserted = sqlx::query(
            "INSERT INTO keywords (id, keyword, target_url, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&created.id)
        .bind(&created.keyword)
        .bind(&created.target_url)
        .bind(created.created_at.timestamp_millis())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(created),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::Validation(DUPLICATE_KEYWORD.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_keyword(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM rankings WHERE keyword_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM keywords WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn create_ranking(&self, ranking: NewRanking) -> Result<Ranking> {
        let created = Ranking {
            id: Uuid::new_v4().to_string(),
            keyword_id: ranking.keyword_id,
            position: ranking.position,
            url: ranking.url,
            title: ranking.title,
            snippet: ranking.snippet,
            checked_at: to_stored_precision(ranking.checked_at)?,
        };

        sqlx::query(
            r#"
            INSERT INTO rankings (id, keyword_id, position, url, title, snippet, checked_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&created.id)
        .bind(&created.keyword_id)
        .bind(created.position.map(i64::from))
        .bind(&created.url)
        .bind(&created.title)
        .bind(&created.snippet)
        .bind(created.checked_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    async fn ranking_history(&self, keyword_id: &str, limit: i64) -> Result<Vec<Ranking>> {
        let rows = sqlx::query(
            r#"
            SELECT id, keyword_id, position, url, title, snippet, checked_at FROM (
                SELECT id, keyword_id, position, url, title, snippet, checked_at, rowid AS seq
                FROM rankings
                WHERE keyword_id = ?
                ORDER BY checked_at DESC, rowid DESC
                LIMIT ?
            )
            ORDER BY checked_at ASC, seq ASC
            "#,
        )
        .bind(keyword_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_ranking).collect()
    }
}
