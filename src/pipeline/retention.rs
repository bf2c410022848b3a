use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::db::Repository;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionReport {
    pub raw_deleted: usize,
    pub published_deleted: usize,
}

/// Drop raw and published rows older than `retention_days`.
pub async fn sweep(
    repository: &Repository,
    now: DateTime<Utc>,
    retention_days: i64,
) -> Result<RetentionReport> {
    let cutoff = now - Duration::days(retention_days);
    let purged = repository.purge_older_than(cutoff).await?;

    if purged.raw > 0 || purged.published > 0 {
        tracing::info!(
            "Retention sweep removed {} raw and {} published items older than {}",
            purged.raw,
            purged.published,
            cutoff
        );
    }

    Ok(RetentionReport {
        raw_deleted: purged.raw,
        published_deleted: purged.published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPublishedItem, NewRawItem};
    use chrono::TimeZone;

    async fn add(repo: &Repository, url: &str, at: DateTime<Utc>) {
        repo.insert_raw_items(
            vec![NewRawItem {
                title: "t".to_string(),
                source: "s".to_string(),
                source_url: url.to_string(),
                category: "general".to_string(),
                published_at: at,
            }],
            at,
        )
        .await
        .unwrap();
        repo.publish(
            NewPublishedItem {
                title: "t".to_string(),
                title_ko: "t".to_string(),
                summary: "s".to_string(),
                summary_ko: "s".to_string(),
                category: "general".to_string(),
                source: "s".to_string(),
                source_url: url.to_string(),
                published_at: at,
            },
            at,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_items_older_than_window_are_gone() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path().join("news.db").to_str().unwrap())
            .await
            .unwrap();
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        add(&repo, "https://stale", now - Duration::days(31)).await;
        add(&repo, "https://edge", now - Duration::days(30)).await;
        add(&repo, "https://fresh", now - Duration::days(1)).await;

        let report = sweep(&repo, now, 30).await.unwrap();

        assert_eq!(
            report,
            RetentionReport {
                raw_deleted: 1,
                published_deleted: 1
            }
        );
        let urls = repo.existing_source_urls().await.unwrap();
        assert!(!urls.contains("https://stale"));
        assert!(urls.contains("https://edge"));
        assert!(urls.contains("https://fresh"));

        let again = sweep(&repo, now, 30).await.unwrap();
        assert_eq!(again, RetentionReport::default());
    }
}
