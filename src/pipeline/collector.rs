use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Repository;
use crate::error::Result;
use crate::feed::NewsSearchClient;
use crate::models::{FeedItem, NewRawItem};

use super::Classifier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectReport {
    /// Unique links across all keywords.
    pub fetched: usize,
    /// Unique links inside the recency window.
    pub recent_news: usize,
    pub raw_saved: usize,
}

/// Keyword search → dedupe → recency filter → provisional category → raw table.
pub struct Collector<'a> {
    pub search: &'a NewsSearchClient,
    pub classifier: &'a Classifier,
    pub keywords: &'a [String],
    pub items_per_keyword: usize,
    pub keyword_delay: Duration,
    /// `None` keeps items regardless of age.
    pub recency_window: Option<chrono::Duration>,
}

impl Collector<'_> {
    /// Query every keyword in turn. A failed keyword contributes nothing.
    pub async fn gather(&self) -> Vec<FeedItem> {
        let mut all = Vec::new();

        for (i, keyword) in self.keywords.iter().enumerate() {
            match self.search.search(keyword, self.items_per_keyword).await {
                Ok(items) => all.extend(items),
                Err(e) => tracing::warn!("Error fetching RSS for '{}': {}", keyword, e),
            }

            if i + 1 < self.keywords.len() && !self.keyword_delay.is_zero() {
                tokio::time::sleep(self.keyword_delay).await;
            }
        }

        dedupe_by_link(all)
    }

    pub async fn run(&self, repository: &Repository, now: DateTime<Utc>) -> Result<CollectReport> {
        tracing::info!("Fetching news for {} keywords", self.keywords.len());
        let unique = self.gather().await;
        let fetched = unique.len();
        tracing::info!("Found {} unique news items", fetched);

        let recent: Vec<FeedItem> = unique
            .into_iter()
            .filter(|item| is_recent(item.published_at, now, self.recency_window))
            .collect();
        let recent_news = recent.len();
        tracing::info!("Recent news: {} items", recent_news);

        let known = repository.existing_source_urls().await?;
        let new_items: Vec<NewRawItem> = recent
            .into_iter()
            .filter(|item| !known.contains(&item.link))
            .map(|item| NewRawItem {
                category: self.classifier.classify(&item.title, &item.snippet).to_string(),
                published_at: item.published_at.unwrap_or(now),
                title: item.title,
                source: item.source,
                source_url: item.link,
            })
            .collect();

        let raw_saved = if new_items.is_empty() {
            0
        } else {
            repository.insert_raw_items(new_items, now).await?
        };
        tracing::info!("Saved {} raw news items", raw_saved);

        Ok(CollectReport {
            fetched,
            recent_news,
            raw_saved,
        })
    }
}

/// Keep the first occurrence of each link, preserving order.
pub fn dedupe_by_link(items: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.link.clone()))
        .collect()
}

/// Undated items only pass when no window is set.
pub fn is_recent(
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Option<chrono::Duration>,
) -> bool {
    match (window, published_at) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(window), Some(ts)) => now - ts <= window,
    }
}
