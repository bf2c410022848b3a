use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::ai::{parse_digest_reply, prompt, ChainOutcome, DigestReply, ModelChain};
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{CategoryCounts, DailyDigest, PublishedNewsItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestReport {
    pub message: String,
    pub date: NaiveDate,
    pub news_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<CategoryCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "summary_ko", skip_serializing_if = "Option::is_none")]
    pub summary_ko: Option<String>,
}

/// Aggregates one local calendar day of published news into a digest row.
pub struct DigestBuilder<'a> {
    pub models: &'a ModelChain,
    pub offset: FixedOffset,
    pub categories: &'a [String],
    pub top_items: usize,
}

impl DigestBuilder<'_> {
    /// The requested day, else the day of the newest published item, else today.
    pub async fn resolve_date(
        &self,
        repository: &Repository,
        requested: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<NaiveDate> {
        if let Some(date) = requested {
            return check_date(date);
        }
        let latest = repository.latest_published_at().await?;
        Ok(local_date(latest.unwrap_or(now), self.offset))
    }

    pub async fn build(
        &self,
        repository: &Repository,
        requested: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<DigestReport> {
        let date = self.resolve_date(repository, requested, now).await?;
        tracing::info!("Generating digest for {} (UTC{})", date, self.offset);

        let (start, end) = day_bounds(date, self.offset)?;
        let items = repository.published_between(start, end).await?;

        if items.is_empty() {
            tracing::info!("No news found for {}", date);
            return Ok(DigestReport {
                message: "No news found for digest".to_string(),
                date,
                news_count: 0,
                counts: None,
                summary: None,
                summary_ko: None,
            });
        }

        tracing::info!("Found {} news items", items.len());
        let counts = count_by_category(&items, self.categories);
        let top = &items[..items.len().min(self.top_items)];
        let reply = self.summarize(top).await;

        let digest = DailyDigest {
            digest_date: date,
            summary: reply.summary,
            summary_ko: reply.summary_ko,
            total_news_count: items.len() as i64,
            category_counts: counts,
            updated_at: now,
        };
        repository.upsert_digest(&digest).await?;
        tracing::info!("Digest saved for {}", date);

        Ok(DigestReport {
            message: "Digest generated successfully".to_string(),
            date,
            news_count: items.len(),
            counts: Some(digest.category_counts),
            summary: Some(digest.summary),
            summary_ko: Some(digest.summary_ko),
        })
    }

    /// Recount a day and store the counters, leaving any summary untouched.
    /// Days without news are not written.
    pub async fn refresh_counts(
        &self,
        repository: &Repository,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CategoryCounts> {
        let (start, end) = day_bounds(date, self.offset)?;
        let items = repository.published_between(start, end).await?;
        let counts = count_by_category(&items, self.categories);

        if !items.is_empty() {
            repository
                .upsert_digest_counts(date, items.len() as i64, &counts, now)
                .await?;
        }
        Ok(counts)
    }

    async fn summarize(&self, items: &[PublishedNewsItem]) -> DigestReply {
        match self.models.generate(&prompt::daily_digest(items)).await {
            ChainOutcome::Reply { text, model } => {
                tracing::debug!("Digest reply from {} ({} chars)", model, text.len());
                parse_digest_reply(&text).unwrap_or_else(|| {
                    tracing::warn!("Could not parse digest reply: {}", text.chars().take(500).collect::<String>());
                    DigestReply::default()
                })
            }
            ChainOutcome::Failed { model, reason } => {
                tracing::warn!("{} failed to write digest: {}", model, reason);
                DigestReply::default()
            }
            ChainOutcome::Exhausted => {
                tracing::warn!("No model available for digest");
                DigestReply::default()
            }
        }
    }
}

pub fn local_date(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

/// Parse `YYYY-MM-DD`, limited to four-digit years so stored RFC 3339
/// timestamps still compare as strings.
pub fn parse_digest_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate(value.to_string()))
        .and_then(check_date)
}

fn check_date(date: NaiveDate) -> Result<NaiveDate> {
    if (1..=9999).contains(&date.year()) {
        Ok(date)
    } else {
        Err(AppError::InvalidDate(date.to_string()))
    }
}

/// `[start, end)` in UTC for a calendar day at `offset`.
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let overflow = || AppError::InvalidDate(date.to_string());
    let local_midnight = date.and_time(NaiveTime::MIN);
    let start = local_midnight
        .checked_sub_signed(Duration::seconds(offset.local_minus_utc() as i64))
        .ok_or_else(overflow)?
        .and_utc();
    let end = start.checked_add_signed(Duration::days(1)).ok_or_else(overflow)?;
    Ok((start, end))
}

/// Every known category is present; unknown categories are counted too.
pub fn count_by_category(items: &[PublishedNewsItem], categories: &[String]) -> CategoryCounts {
    let mut counts: CategoryCounts = categories.iter().map(|c| (c.clone(), 0)).collect();
    for item in items {
        *counts.entry(item.category.clone()).or_insert(0) += 1;
    }
    counts
}
