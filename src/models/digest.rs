use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Article count per category name.
pub type CategoryCounts = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDigest {
    pub digest_date: NaiveDate,
    pub summary: String,
    pub summary_ko: String,
    pub total_news_count: i64,
    pub category_counts: CategoryCounts,
    pub updated_at: DateTime<Utc>,
}
