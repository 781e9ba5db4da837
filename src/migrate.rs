use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the database file and schema. Safe to run repeatedly.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Create keywords table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS keywords (
            id TEXT PRIMARY KEY,
            keyword TEXT NOT NULL UNIQUE,
            target_url TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create rankings table (append-only history)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rankings (
            id TEXT PRIMARY KEY,
            keyword_id TEXT NOT NULL,
            position INTEGER,
            url TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            snippet TEXT NOT NULL DEFAULT '',
            checked_at INTEGER NOT NULL,
            FOREIGN KEY (keyword_id) REFERENCES keywords(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_rankings_keyword_checked ON rankings(keyword_id, checked_at)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_keywords_created_at ON keywords(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
