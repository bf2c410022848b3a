use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry pulled out of a news search feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    /// Plain-text rendering of the entry description, if any.
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub struct NewRawItem {
    pub title: String,
    pub source: String,
    pub source_url: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
}

/// Staging row written by the collector and consumed by the summarizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNewsItem {
    pub id: i64,
    pub title: String,
    pub source: String,
    pub source_url: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
    pub is_processed: bool,
}

#[derive(Debug, Clone)]
pub struct NewPublishedItem {
    pub title: String,
    pub title_ko: String,
    pub summary: String,
    pub summary_ko: String,
    pub category: String,
    pub source: String,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedNewsItem {
    pub id: i64,
    pub title: String,
    pub title_ko: String,
    pub summary: String,
    pub summary_ko: String,
    pub category: String,
    pub source: String,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
