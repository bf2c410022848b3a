use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{
    CategoryCounts, DailyDigest, NewPublishedItem, NewRawItem, PublishedNewsItem, RawNewsItem,
};

use super::schema::SCHEMA;

/// Result of moving one raw item into the published table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// The URL was already published; the raw row is still flagged processed.
    AlreadyPublished,
    /// No raw row carries this URL, so nothing was written.
    UnknownSource,
}

/// Rows removed by a retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeCounts {
    pub raw: usize,
    pub published: usize,
}

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Raw news operations

    /// Every source_url known to either table.
    pub async fn existing_source_urls(&self) -> Result<HashSet<String>> {
        let urls = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT source_url FROM raw_news UNION SELECT source_url FROM published_news",
                )?;
                let urls = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<HashSet<_>, _>>()?;
                Ok(urls)
            })
            .await?;
        Ok(urls)
    }

    /// Insert new staging rows in one transaction. URLs already present are
    /// ignored; returns how many rows were actually written.
    pub async fn insert_raw_items(
        &self,
        items: Vec<NewRawItem>,
        collected_at: DateTime<Utc>,
    ) -> Result<usize> {
        let collected_at = db_time(&collected_at);
        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                {
                    let mut stmt = tx.prepare(
                        r#"INSERT INTO raw_news (title, source, source_url, category, published_at, collected_at, is_processed)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
                           ON CONFLICT(source_url) DO NOTHING"#,
                    )?;
                    for item in &items {
                        inserted += stmt.execute(params![
                            item.title,
                            item.source,
                            item.source_url,
                            item.category,
                            db_time(&item.published_at),
                            collected_at,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await?;
        Ok(inserted)
    }

    /// Pending items, most recently published first.
    pub async fn unprocessed_raw_items(&self, limit: usize) -> Result<Vec<RawNewsItem>> {
        let limit = limit as i64;
        let items = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, title, source, source_url, category, published_at, collected_at, is_processed
                       FROM raw_news
                       WHERE is_processed = 0
                       ORDER BY published_at DESC, id DESC
                       LIMIT ?1"#,
                )?;
                let items = stmt
                    .query_map(params![limit], raw_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    pub async fn get_raw_item(&self, source_url: &str) -> Result<Option<RawNewsItem>> {
        let source_url = source_url.to_string();
        let item = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, title, source, source_url, category, published_at, collected_at, is_processed
                       FROM raw_news WHERE source_url = ?1"#,
                )?;
                let item = stmt.query_row(params![source_url], raw_from_row).optional()?;
                Ok(item)
            })
            .await?;
        Ok(item)
    }

    // Published news operations

    /// Insert the enriched record and flag its raw row processed, atomically.
    pub async fn publish(
        &self,
        item: NewPublishedItem,
        created_at: DateTime<Utc>,
    ) -> Result<PublishOutcome> {
        let created_at = db_time(&created_at);
        let outcome = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let marked = tx.execute(
                    "UPDATE raw_news SET is_processed = 1 WHERE source_url = ?1",
                    params![item.source_url],
                )?;
                if marked == 0 {
                    return Ok(PublishOutcome::UnknownSource);
                }
                let inserted = tx.execute(
                    r#"INSERT INTO published_news (title, title_ko, summary, summary_ko, category, source, source_url, published_at, created_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                       ON CONFLICT(source_url) DO NOTHING"#,
                    params![
                        item.title,
                        item.title_ko,
                        item.summary,
                        item.summary_ko,
                        item.category,
                        item.source,
                        item.source_url,
                        db_time(&item.published_at),
                        created_at,
                    ],
                )?;
                tx.commit()?;
                Ok(if inserted > 0 {
                    PublishOutcome::Published
                } else {
                    PublishOutcome::AlreadyPublished
                })
            })
            .await?;
        Ok(outcome)
    }

    pub async fn latest_published_at(&self) -> Result<Option<DateTime<Utc>>> {
        let latest = self
            .conn
            .call(|conn| {
                let latest: Option<String> = conn.query_row(
                    "SELECT MAX(published_at) FROM published_news",
                    [],
                    |row| row.get(0),
                )?;
                Ok(latest)
            })
            .await?;
        Ok(latest.and_then(|s| parse_datetime(&s)))
    }

    /// Published items with `start <= published_at < end`, newest first.
    pub async fn published_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PublishedNewsItem>> {
        let (start, end) = (db_time(&start), db_time(&end));
        let items = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, title, title_ko, summary, summary_ko, category, source, source_url, published_at, created_at
                       FROM published_news
                       WHERE published_at >= ?1 AND published_at < ?2
                       ORDER BY published_at DESC, id DESC"#,
                )?;
                let items = stmt
                    .query_map(params![start, end], published_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    // Digest operations

    pub async fn upsert_digest(&self, digest: &DailyDigest) -> Result<()> {
        let counts = serde_json::to_string(&digest.category_counts)?;
        let date = digest.digest_date.to_string();
        let summary = digest.summary.clone();
        let summary_ko = digest.summary_ko.clone();
        let total = digest.total_news_count;
        let updated_at = db_time(&digest.updated_at);
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO daily_digest (digest_date, summary, summary_ko, total_news_count, category_counts, updated_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                       ON CONFLICT(digest_date) DO UPDATE SET
                           summary = excluded.summary,
                           summary_ko = excluded.summary_ko,
                           total_news_count = excluded.total_news_count,
                           category_counts = excluded.category_counts,
                           updated_at = excluded.updated_at"#,
                    params![date, summary, summary_ko, total, counts, updated_at],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Upsert only the counters of a day, keeping any summary already written.
    pub async fn upsert_digest_counts(
        &self,
        date: NaiveDate,
        total: i64,
        counts: &CategoryCounts,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let counts = serde_json::to_string(counts)?;
        let date = date.to_string();
        let updated_at = db_time(&updated_at);
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO daily_digest (digest_date, total_news_count, category_counts, updated_at)
                       VALUES (?1, ?2, ?3, ?4)
                       ON CONFLICT(digest_date) DO UPDATE SET
                           total_news_count = excluded.total_news_count,
                           category_counts = excluded.category_counts,
                           updated_at = excluded.updated_at"#,
                    params![date, total, counts, updated_at],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn get_digest(&self, date: NaiveDate) -> Result<Option<DailyDigest>> {
        let date = date.to_string();
        let digest = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT digest_date, summary, summary_ko, total_news_count, category_counts, updated_at
                       FROM daily_digest WHERE digest_date = ?1"#,
                )?;
                let digest = stmt.query_row(params![date], digest_from_row).optional()?;
                Ok(digest)
            })
            .await?;
        Ok(digest)
    }

    // Retention

    /// Delete raw rows collected and published rows created before `cutoff`.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<PurgeCounts> {
        let cutoff = db_time(&cutoff);
        let counts = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let published = tx.execute(
                    "DELETE FROM published_news WHERE created_at < ?1",
                    params![cutoff],
                )?;
                let raw = tx.execute(
                    "DELETE FROM raw_news WHERE collected_at < ?1",
                    params![cutoff],
                )?;
                tx.commit()?;
                Ok(PurgeCounts { raw, published })
            })
            .await?;
        Ok(counts)
    }
}

fn db_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn datetime_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_datetime(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {}", text).into(),
        )
    })
}

fn raw_from_row(row: &Row) -> rusqlite::Result<RawNewsItem> {
    Ok(RawNewsItem {
        id: row.get(0)?,
        title: row.get(1)?,
        source: row.get(2)?,
        source_url: row.get(3)?,
        category: row.get(4)?,
        published_at: datetime_column(row, 5)?,
        collected_at: datetime_column(row, 6)?,
        is_processed: row.get::<_, i64>(7)? != 0,
    })
}

fn published_from_row(row: &Row) -> rusqlite::Result<PublishedNewsItem> {
    Ok(PublishedNewsItem {
        id: row.get(0)?,
        title: row.get(1)?,
        title_ko: row.get(2)?,
        summary: row.get(3)?,
        summary_ko: row.get(4)?,
        category: row.get(5)?,
        source: row.get(6)?,
        source_url: row.get(7)?,
        published_at: datetime_column(row, 8)?,
        created_at: datetime_column(row, 9)?,
    })
}

fn digest_from_row(row: &Row) -> rusqlite::Result<DailyDigest> {
    let date: String = row.get(0)?;
    let digest_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let counts: String = row.get(4)?;
    let category_counts = serde_json::from_str(&counts)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(DailyDigest {
        digest_date,
        summary: row.get(1)?,
        summary_ko: row.get(2)?,
        total_news_count: row.get(3)?,
        category_counts,
        updated_at: datetime_column(row, 5)?,
    })
}
