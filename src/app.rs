use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::ai::{GeminiModel, LanguageModel, ModelChain};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::feed::NewsSearchClient;
use crate::models::CategoryCounts;
use crate::pipeline::digest::local_date;
use crate::pipeline::{
    retention, Classifier, CollectReport, Collector, DigestBuilder, DigestReport,
    RetentionReport, SummarizeReport, Summarizer,
};

/// Everything one fetch-news invocation did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchNewsReport {
    pub message: String,
    pub fetched: usize,
    pub recent_news: usize,
    pub raw_saved: usize,
    pub processed: usize,
    pub skipped: usize,
    pub stopped_early: bool,
    pub today_counts: CategoryCounts,
    pub purged: RetentionReport,
}

pub struct App {
    pub config: Config,
    pub repository: Repository,
    search: NewsSearchClient,
    classifier: Classifier,
    models: Option<ModelChain>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let search = NewsSearchClient::new(config.news_search_url.clone())?;

        let models = match &config.gemini_api_key {
            Some(key) => {
                let client = GeminiModel::http_client()?;
                let tiers: Vec<Box<dyn LanguageModel>> = config
                    .models
                    .iter()
                    .map(|model| {
                        Box::new(GeminiModel::new(
                            client.clone(),
                            config.gemini_base_url.clone(),
                            model.clone(),
                            key.clone(),
                        )) as Box<dyn LanguageModel>
                    })
                    .collect();
                let chain = ModelChain::new(tiers);
                tracing::debug!("Model tiers: {}", chain.model_names().join(", "));
                Some(chain)
            }
            None => {
                tracing::warn!("gemini_api_key is not set; only collect and cleanup will run");
                None
            }
        };

        Ok(Self::from_parts(config, repository, search, models))
    }

    pub fn from_parts(
        config: Config,
        repository: Repository,
        search: NewsSearchClient,
        models: Option<ModelChain>,
    ) -> Self {
        let classifier = Classifier::from_config(&config);
        Self {
            config,
            repository,
            search,
            classifier,
            models,
        }
    }

    fn models(&self) -> Result<&ModelChain> {
        self.models
            .as_ref()
            .ok_or_else(|| AppError::Config("gemini_api_key is not set".to_string()))
    }

    fn digest_builder<'a>(
        &'a self,
        models: &'a ModelChain,
        categories: &'a [String],
    ) -> Result<DigestBuilder<'a>> {
        Ok(DigestBuilder {
            models,
            offset: self.config.utc_offset()?,
            categories,
            top_items: self.config.digest_top_items,
        })
    }

    pub async fn collect(&self) -> Result<CollectReport> {
        let keywords = self.config.search_keywords();
        let recency_window = (self.config.recency_window_hours > 0)
            .then(|| chrono::Duration::hours(self.config.recency_window_hours));

        let collector = Collector {
            search: &self.search,
            classifier: &self.classifier,
            keywords: &keywords,
            items_per_keyword: self.config.items_per_keyword,
            keyword_delay: self.config.keyword_delay(),
            recency_window,
        };
        collector.run(&self.repository, Utc::now()).await
    }

    pub async fn summarize(&self) -> Result<SummarizeReport> {
        let summarizer = Summarizer {
            models: self.models()?,
            classifier: &self.classifier,
            batch_size: self.config.batch_size,
            item_delay: self.config.item_delay(),
        };
        summarizer.run(&self.repository).await
    }

    pub async fn build_digest(&self, date: Option<NaiveDate>) -> Result<DigestReport> {
        let categories = self.config.categories();
        let builder = self.digest_builder(self.models()?, &categories)?;
        builder.build(&self.repository, date, Utc::now()).await
    }

    pub async fn cleanup(&self) -> Result<RetentionReport> {
        retention::sweep(&self.repository, Utc::now(), self.config.retention_days).await
    }

    /// Collect, summarize a batch, refresh today's digest counters, then sweep.
    pub async fn fetch_news(&self) -> Result<FetchNewsReport> {
        let models = self.models()?;

        let collected = self.collect().await?;
        let summarized = self.summarize().await?;

        let now = Utc::now();
        let categories = self.config.categories();
        let builder = self.digest_builder(models, &categories)?;
        let today = local_date(now, builder.offset);
        let today_counts = builder.refresh_counts(&self.repository, today, now).await?;

        let purged = self.cleanup().await?;

        let message = if summarized.pending == 0 {
            "Raw news saved, no unprocessed items to summarize"
        } else {
            "News fetch completed"
        };

        Ok(FetchNewsReport {
            message: message.to_string(),
            fetched: collected.fetched,
            recent_news: collected.recent_news,
            raw_saved: collected.raw_saved,
            processed: summarized.processed,
            skipped: summarized.skipped,
            stopped_early: summarized.stopped_early,
            today_counts,
            purged,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ai::testing::ScriptedModel;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const SUMMARY_REPLY: &str = r#"{"summary": "Programmatic spend keeps climbing.", "summary_ko": "프로그래매틱 지출이 계속 늘고 있다.", "title_ko": "프로그래매틱 지출 증가"}"#;

    pub fn feed_body() -> String {
        let published = Utc::now().to_rfc2822();
        format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title><link>https://news.google.com</link><description>d</description>
<item><title>Programmatic ad spend up 20% - AdExchanger</title><link>https://n.test/1</link><pubDate>{0}</pubDate></item>
<item><title>Braze adds journeys - MarTech</title><link>https://n.test/2</link><pubDate>{0}</pubDate></item>
</channel></rss>"#,
            published
        )
    }

    /// App wired to a mock search endpoint and a scripted model.
    pub async fn test_app(
        server: &MockServer,
        dir: &tempfile::TempDir,
        models: Option<ModelChain>,
    ) -> App {
        let config = Config {
            db_path: dir.path().join("news.db").to_string_lossy().to_string(),
            news_search_url: server.uri(),
            keyword_groups: vec![crate::config::KeywordGroup {
                name: "adtech".to_string(),
                keywords: vec!["programmatic advertising".to_string()],
            }],
            keyword_delay_ms: 0,
            item_delay_ms: 0,
            cron_secret: Some("s3cret".to_string()),
            ..Config::default()
        };
        let repository = Repository::new(&config.db_path).await.unwrap();
        let search = NewsSearchClient::new(config.news_search_url.clone()).unwrap();
        App::from_parts(config, repository, search, models)
    }

    pub async fn feed_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed_body()))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_fetch_news_end_to_end() {
        let server = feed_server().await;
        let dir = tempfile::tempdir().unwrap();
        let models = ModelChain::new(vec![Box::new(ScriptedModel::replying(
            "m",
            &[SUMMARY_REPLY, SUMMARY_REPLY],
        ))]);
        let app = test_app(&server, &dir, Some(models)).await;

        let report = app.fetch_news().await.unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.raw_saved, 2);
        assert_eq!(report.processed, 2);
        assert_eq!(report.today_counts.values().sum::<i64>(), 2);

        let today = local_date(Utc::now(), app.config.utc_offset().unwrap());
        let digest = app.repository.get_digest(today).await.unwrap().unwrap();
        assert_eq!(digest.total_news_count, 2);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let server = feed_server().await;
        let dir = tempfile::tempdir().unwrap();
        let models = ModelChain::new(vec![Box::new(ScriptedModel::replying(
            "m",
            &[SUMMARY_REPLY, SUMMARY_REPLY, SUMMARY_REPLY],
        ))]);
        let app = test_app(&server, &dir, Some(models)).await;

        app.fetch_news().await.unwrap();
        let second = app.fetch_news().await.unwrap();

        assert_eq!(second.raw_saved, 0);
        assert_eq!(second.processed, 0);
        assert_eq!(second.message, "Raw news saved, no unprocessed items to summarize");
        assert_eq!(app.repository.existing_source_urls().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_summarize_without_key_is_config_error() {
        let server = feed_server().await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&server, &dir, None).await;

        assert!(matches!(app.summarize().await, Err(AppError::Config(_))));
        assert!(app.collect().await.is_ok());
    }
}
