// Timestamps are stored as RFC 3339 UTC text ("2026-01-11T12:34:56Z") so that
// range filters can compare them as strings.
pub const SCHEMA: &str = r#"
-- raw_news table (collector staging)
CREATE TABLE IF NOT EXISTS raw_news (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    source TEXT NOT NULL,
    source_url TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL,
    published_at TEXT NOT NULL,
    collected_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    is_processed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_raw_news_pending ON raw_news(is_processed, published_at DESC);
CREATE INDEX IF NOT EXISTS idx_raw_news_collected_at ON raw_news(collected_at);

-- published_news table (summarized, bilingual)
CREATE TABLE IF NOT EXISTS published_news (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    title_ko TEXT NOT NULL,
    summary TEXT NOT NULL,
    summary_ko TEXT NOT NULL,
    category TEXT NOT NULL,
    source TEXT NOT NULL,
    source_url TEXT NOT NULL UNIQUE,
    published_at TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_published_news_published_at ON published_news(published_at DESC);
CREATE INDEX IF NOT EXISTS idx_published_news_created_at ON published_news(created_at);

-- daily_digest table (one row per local calendar day)
CREATE TABLE IF NOT EXISTS daily_digest (
    digest_date TEXT PRIMARY KEY,
    summary TEXT NOT NULL DEFAULT '',
    summary_ko TEXT NOT NULL DEFAULT '',
    total_news_count INTEGER NOT NULL DEFAULT 0,
    category_counts TEXT NOT NULL DEFAULT '{}',
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);
"#;
