use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::ai::{parse_summary_reply, prompt, ChainOutcome, ModelChain};
use crate::db::{PublishOutcome, Repository};
use crate::error::Result;
use crate::models::{NewPublishedItem, RawNewsItem};

use super::Classifier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeReport {
    /// Unprocessed items pulled for this run.
    pub pending: usize,
    pub processed: usize,
    /// Items left unprocessed because of a bad or rejected reply.
    pub skipped: usize,
    /// Set when every model tier ran out of quota.
    pub stopped_early: bool,
}

/// Turns pending raw items into bilingual published items, one model call at a time.
pub struct Summarizer<'a> {
    pub models: &'a ModelChain,
    pub classifier: &'a Classifier,
    pub batch_size: usize,
    pub item_delay: Duration,
}

enum ItemResult {
    Done(NewPublishedItem),
    Skipped,
    Exhausted,
}

impl Summarizer<'_> {
    pub async fn run(&self, repository: &Repository) -> Result<SummarizeReport> {
        let batch = repository.unprocessed_raw_items(self.batch_size).await?;
        let mut report = SummarizeReport {
            pending: batch.len(),
            ..SummarizeReport::default()
        };

        if batch.is_empty() {
            tracing::info!("No unprocessed items");
            return Ok(report);
        }
        tracing::info!("Processing {} items", batch.len());

        for (i, item) in batch.iter().enumerate() {
            let short: String = item.title.chars().take(50).collect();

            match self.summarize_item(item).await {
                ItemResult::Done(published) => {
                    match repository.publish(published, Utc::now()).await? {
                        PublishOutcome::Published => {
                            report.processed += 1;
                            tracing::info!("[{}/{}] {}", i + 1, batch.len(), short);
                        }
                        PublishOutcome::AlreadyPublished => {
                            tracing::info!("Already published, marked processed: {}", short);
                        }
                        PublishOutcome::UnknownSource => {
                            tracing::warn!("Raw item vanished before publishing: {}", short);
                        }
                    }
                }
                ItemResult::Skipped => {
                    report.skipped += 1;
                }
                ItemResult::Exhausted => {
                    tracing::warn!("All models rate limited, stopping batch");
                    report.stopped_early = true;
                    break;
                }
            }

            if i + 1 < batch.len() && !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }
        }

        Ok(report)
    }

    async fn summarize_item(&self, item: &RawNewsItem) -> ItemResult {
        let text = match self.models.generate(&prompt::article_summary(&item.title)).await {
            ChainOutcome::Reply { text, .. } => text,
            ChainOutcome::Failed { model, reason } => {
                tracing::warn!("{} failed on '{}': {}", model, item.title, reason);
                return ItemResult::Skipped;
            }
            ChainOutcome::Exhausted => return ItemResult::Exhausted,
        };

        let reply = match parse_summary_reply(&text) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Unusable reply for '{}': {}", item.title, e);
                return ItemResult::Skipped;
            }
        };

        let category = self.classifier.classify(&item.title, &reply.summary).to_string();
        let title_ko = reply
            .title_ko
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| item.title.clone());

        ItemResult::Done(NewPublishedItem {
            title: item.title.clone(),
            title_ko,
            summary: reply.summary,
            summary_ko: reply.summary_ko,
            category,
            source: item.source.clone(),
            source_url: item.source_url.clone(),
            published_at: item.published_at,
        })
    }
}
