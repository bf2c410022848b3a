//! Default values for configuration

use std::path::PathBuf;

use super::{CategoryRule, KeywordGroup};

pub fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ad-news");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("news.db").to_string_lossy().to_string()
}

pub fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

pub fn default_news_search_url() -> String {
    "https://news.google.com/rss/search".to_string()
}

/// Model tiers, highest priority first
pub fn default_models() -> Vec<String> {
    vec![
        "gemini-3-flash".to_string(),
        "gemini-2.5-flash-lite".to_string(),
    ]
}

pub fn default_category() -> String {
    "general".to_string()
}

pub fn default_items_per_keyword() -> usize {
    3
}

pub fn default_keyword_delay_ms() -> u64 {
    500
}

pub fn default_recency_window_hours() -> i64 {
    48
}

/// Sized so one run fits a 60s invocation and a 5 RPM free-tier quota
pub fn default_batch_size() -> usize {
    4
}

pub fn default_item_delay_ms() -> u64 {
    13_000
}

/// KST
pub fn default_utc_offset_hours() -> i32 {
    9
}

pub fn default_retention_days() -> i64 {
    30
}

pub fn default_digest_top_items() -> usize {
    10
}

pub fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn default_keyword_groups() -> Vec<KeywordGroup> {
    vec![
        KeywordGroup {
            name: "adtech".to_string(),
            keywords: strings(&[
                // Core ad tech
                "programmatic advertising",
                "real-time bidding RTB",
                "demand side platform DSP",
                "supply side platform SSP",
                "ad exchange platform",
                "ad network mobile",
                "header bidding advertising",
                "ad server technology",
                // Mobile
                "mobile advertising",
                "in-app advertising revenue",
                "mobile ad SDK",
                "rewarded video ads",
                "interstitial ads",
                "playable ads gaming",
                "app install campaign",
                "user acquisition mobile",
                // Attribution and privacy
                "mobile attribution tracking",
                "SKAdNetwork SKAN iOS",
                "Privacy Sandbox Android",
                "IDFA deprecation iOS",
                "ATT app tracking transparency",
                "privacy-first advertising",
                "cookieless advertising",
                // Video and CTV
                "CTV connected TV advertising",
                "OTT streaming ads",
                "video advertising platform",
                "AVOD advertising",
                "programmatic TV ads",
                // Retail media
                "retail media network",
                "commerce media advertising",
                "Amazon advertising news",
                "shoppable ads retail",
                // Fraud and verification
                "ad fraud prevention",
                "brand safety advertising",
            ]),
        },
        KeywordGroup {
            name: "martech".to_string(),
            keywords: strings(&[
                // MMP vendors
                "mobile measurement partner MMP",
                "Airbridge attribution",
                "Appsflyer mobile attribution",
                "Adjust mobile attribution",
                "Singular mobile attribution",
                "Branch deep linking",
                "Kochava mobile analytics",
                // Analytics
                "Amplitude product analytics",
                "Mixpanel analytics",
                "Firebase analytics mobile",
                "Google Analytics 4 GA4",
                "Heap analytics",
                "PostHog analytics",
                // CDP
                "customer data platform CDP",
                "Segment CDP",
                "mParticle CDP",
                "Tealium CDP",
                "Rudderstack CDP",
                // Engagement
                "Braze customer engagement",
                "CleverTap engagement",
                "OneSignal push notification",
                "Leanplum mobile marketing",
                "Iterable marketing",
                "MoEngage engagement",
                "Insider marketing",
                // Automation
                "marketing automation platform",
                "email marketing automation",
                "push notification marketing",
                "in-app messaging platform",
                "lifecycle marketing",
                "customer journey orchestration",
                // CRM
                "Salesforce marketing cloud",
                "HubSpot marketing",
                "marketing personalization",
            ]),
        },
        KeywordGroup {
            name: "general".to_string(),
            keywords: strings(&[
                "digital marketing trends",
                "advertising industry news",
                "ad spend forecast",
                "marketing technology trends",
                "digital advertising growth",
                "marketing budget trends",
                "adtech martech investment",
                "advertising regulation news",
                "digital marketing innovation",
                "marketing AI automation",
            ]),
        },
    ]
}

/// Checked in order; the first rule with a matching keyword wins.
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule {
            category: "adtech".to_string(),
            keywords: strings(&[
                "programmatic", "rtb", "dsp", "ssp", "real-time bidding", "auction",
                "ad tech", "adtech", "mobile ad", "in-app", "app advertising",
                "rewarded ad", "interstitial", "banner ad", "video ad", "native ad",
                "ad network", "ad exchange", "ad server", "header bidding",
                "skadnetwork", "skan", "privacy sandbox",
                "idfa", "att", "gaid", "advertising id", "app tracking",
                "cookieless", "privacy-first",
                "ctv", "ott", "connected tv", "streaming ad", "display ad", "avod",
                "retail media", "commerce media", "shoppable",
                "ad fraud", "brand safety", "viewability",
            ]),
        },
        CategoryRule {
            category: "martech".to_string(),
            keywords: strings(&[
                "mmp", "appsflyer", "adjust", "branch", "singular", "kochava", "airbridge",
                "mobile measurement", "attribution",
                "amplitude", "mixpanel", "firebase", "ga4", "google analytics",
                "heap", "posthog", "analytics platform",
                "cdp", "customer data platform", "segment", "mparticle", "tealium", "rudderstack",
                "braze", "clevertap", "onesignal", "leanplum", "iterable", "moengage", "insider",
                "salesforce", "hubspot", "marketing cloud",
                "martech", "marketing tech", "marketing automation", "crm",
                "customer data", "personalization", "segmentation",
                "email marketing", "push notification", "engagement", "retention",
                "lifecycle", "journey", "campaign management", "a/b test",
            ]),
        },
    ]
}
