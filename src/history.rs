//! Ranking history for charts.
//!
//! Builds one [`RankingSeries`] per keyword holding its most recent
//! rankings, oldest first, capped at `history.limit` points.

use crate::config::Config;
use crate::error::Result;
use crate::models::{RankingPoint, RankingSeries};
use crate::store::{SqliteStore, Store};

pub async fn ranking_series(store: &dyn Store, limit: i64) -> Result<Vec<RankingSeries>> {
    let keywords = store.list_keywords().await?;
    let mut series = Vec::with_capacity(keywords.len());

    for kw in keywords {
        let data = store
            .ranking_history(&kw.id, limit)
            .await?
            .into_iter()
            .map(|r| RankingPoint {
                date: r.checked_at,
                position: r.position,
            })
            .collect();
        series.push(RankingSeries {
            keyword_id: kw.id,
            keyword: kw.keyword,
            data,
        });
    }

    Ok(series)
}

/// CLI entry point for `rtrack history`.
pub async fn run_history(config: &Config, limit: Option<i64>) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.history.limit);
    if limit < 1 {
        anyhow::bail!("--limit must be >= 1");
    }

    let store = SqliteStore::connect(config).await?;
    let series = ranking_series(&store, limit).await;
    store.close().await;
    let series = series?;

    if series.is_empty() {
        println!("No keywords tracked.");
        return Ok(());
    }

    for s in &series {
        println!("{} ({} points)", s.keyword, s.data.len());
        for point in &s.data {
            let position = point
                .position
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {}  {}", point.date.format("%Y-%m-%d %H:%M:%S"), position);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewKeyword, NewRanking};
    use crate::store::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_series_per_keyword_capped() {
        let store = InMemoryStore::new();
        let busy = store
            .create_keyword(NewKeyword {
                keyword: "busy".to_string(),
                target_url: "https://a.com/".to_string(),
            })
            .await
            .unwrap();
        store
            .create_keyword(NewKeyword {
                keyword: "quiet".to_string(),
                target_url: "https://b.com/".to_string(),
            })
            .await
            .unwrap();

        let base = Utc.with_ymd_and_hms(2026, 5, 1, 6, 0, 0).unwrap();
        for day in 0..40 {
            store
                .create_ranking(NewRanking {
                    keyword_id: busy.id.clone(),
                    position: Some(day as u32 % 10 + 1),
                    url: "https://a.com/".to_string(),
                    title: String::new(),
                    snippet: String::new(),
                    checked_at: base + Duration::days(day),
                })
                .await
                .unwrap();
        }

        let series = ranking_series(&store, 30).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].keyword, "busy");
        assert_eq!(series[0].data.len(), 30);
        assert_eq!(series[0].data[0].date, base + Duration::days(10));
        assert!(series[0].data.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series[1].keyword, "quiet");
        assert!(series[1].data.is_empty());
    }
}
