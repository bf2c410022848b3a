mod defaults;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub use defaults::*;

/// A named list of search queries sent to the news search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Substrings that assign an article to `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    pub gemini_api_key: Option<String>,
    pub cron_secret: Option<String>,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_news_search_url")]
    pub news_search_url: String,

    #[serde(default = "default_models")]
    pub models: Vec<String>,

    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default = "default_items_per_keyword")]
    pub items_per_keyword: usize,

    #[serde(default = "default_keyword_delay_ms")]
    pub keyword_delay_ms: u64,

    /// 0 disables the recency filter.
    #[serde(default = "default_recency_window_hours")]
    pub recency_window_hours: i64,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    #[serde(default = "default_digest_top_items")]
    pub digest_top_items: usize,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    // Arrays of tables stay last so the TOML serializer can emit them.
    #[serde(default = "default_keyword_groups")]
    pub keyword_groups: Vec<KeywordGroup>,

    #[serde(default = "default_category_rules")]
    pub category_rules: Vec<CategoryRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            gemini_api_key: None,
            cron_secret: None,
            gemini_base_url: default_gemini_base_url(),
            news_search_url: default_news_search_url(),
            models: default_models(),
            default_category: default_category(),
            items_per_keyword: default_items_per_keyword(),
            keyword_delay_ms: default_keyword_delay_ms(),
            recency_window_hours: default_recency_window_hours(),
            batch_size: default_batch_size(),
            item_delay_ms: default_item_delay_ms(),
            utc_offset_hours: default_utc_offset_hours(),
            retention_days: default_retention_days(),
            digest_top_items: default_digest_top_items(),
            bind_addr: default_bind_addr(),
            cors_origins: Vec::new(),
            keyword_groups: default_keyword_groups(),
            category_rules: default_category_rules(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location. A missing file at the
    /// default location is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else if path.is_some() {
            return Err(AppError::Config(format!(
                "config file not found: {}",
                config_path.display()
            )));
        } else {
            let config = Config::default();
            config.save(&config_path)?;
            config
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ad-news")
            .join("config.toml")
    }

    /// Secrets from the environment win over the file.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Ok(secret) = std::env::var("CRON_SECRET") {
            self.cron_secret = Some(secret);
        }
        if let Ok(path) = std::env::var("AD_NEWS_DB_PATH") {
            self.db_path = path;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(AppError::Config("at least one model is required".into()));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config("batch_size must be positive".into()));
        }
        if self.digest_top_items == 0 {
            return Err(AppError::Config("digest_top_items must be positive".into()));
        }
        if self.items_per_keyword == 0 {
            return Err(AppError::Config("items_per_keyword must be positive".into()));
        }
        if self.retention_days <= 0 {
            return Err(AppError::Config("retention_days must be positive".into()));
        }
        self.utc_offset()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(AppError::Config(format!(
                "utc_offset_hours out of range: {}",
                self.utc_offset_hours
            )));
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            AppError::Config(format!("invalid utc offset: {}", self.utc_offset_hours))
        })
    }

    pub fn keyword_delay(&self) -> Duration {
        Duration::from_millis(self.keyword_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    /// Every category the pipeline can assign, rule order first, default last.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .category_rules
            .iter()
            .map(|r| r.category.clone())
            .collect();
        if !categories.contains(&self.default_category) {
            categories.push(self.default_category.clone());
        }
        categories
    }

    pub fn search_keywords(&self) -> Vec<String> {
        self.keyword_groups
            .iter()
            .flat_map(|g| g.keywords.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            db_path = "/tmp/news.db"
            batch_size = 2
            models = ["only-model"]
            "#,
        )
        .unwrap();

        assert_eq!(config.db_path, "/tmp/news.db");
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.models, vec!["only-model".to_string()]);
        assert_eq!(config.items_per_keyword, 3);
        assert_eq!(config.recency_window_hours, 48);
        assert_eq!(config.utc_offset_hours, 9);
        assert_eq!(config.keyword_groups.len(), 3);
    }

    #[test]
    fn test_categories_end_with_default() {
        let config = Config::default();
        assert_eq!(config.categories(), vec!["adtech", "martech", "general"]);
    }

    #[test]
    fn test_validate_rejects_empty_models() {
        let config = Config {
            models: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_digest_items() {
        let config = Config {
            digest_top_items: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_utc_offset_range() {
        let config = Config {
            utc_offset_hours: 20,
            ..Config::default()
        };
        assert!(config.utc_offset().is_err());

        let config = Config::default();
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_save_then_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            db_path: dir.path().join("news.db").to_string_lossy().to_string(),
            batch_size: 7,
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.batch_size, 7);
        assert_eq!(loaded.category_rules, config.category_rules);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
