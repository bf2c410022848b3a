use std::time::Duration;

use std::collections::HashMap;

use feed_rs::parser;
use regex::Regex;
use reqwest::Client;

use crate::error::Result;
use crate::models::FeedItem;

const USER_AGENT: &str = "ad-news/1.0";

/// Client for a Google News style RSS search endpoint.
pub struct NewsSearchClient {
    client: Client,
    base_url: String,
}

impl NewsSearchClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn search_url(&self, keyword: &str) -> String {
        format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            self.base_url,
            urlencoding::encode(keyword)
        )
    }

    /// Fetch the search feed for `keyword` and keep the first `limit` usable entries.
    pub async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<FeedItem>> {
        let url = self.search_url(keyword);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        let items = parse_feed(&bytes[..], limit)?;
        tracing::debug!("Fetched {} items for '{}'", items.len(), keyword);
        Ok(items)
    }
}

/// Parse an RSS/Atom document into feed items. Entries without a title or a
/// link are dropped before `limit` is applied.
pub fn parse_feed(bytes: &[u8], limit: usize) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(bytes)?;
    let sources = item_sources(bytes);

    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())?;
            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .filter(|l| !l.is_empty())?;

            let snippet = entry
                .summary
                .as_ref()
                .and_then(|s| html2text::from_read(s.content.as_bytes(), 200).ok())
                .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();

            Some(FeedItem {
                source: sources
                    .get(&link)
                    .cloned()
                    .unwrap_or_else(|| source_label(&title, &link)),
                title,
                link,
                published_at: entry.published.or(entry.updated),
                snippet,
            })
        })
        .take(limit)
        .collect();

    Ok(items)
}

/// Publisher named by each RSS item's `<source>` element, keyed by link.
/// feed-rs keeps only the Atom form of this element.
fn item_sources(bytes: &[u8]) -> HashMap<String, String> {
    let (Ok(item_re), Ok(link_re), Ok(source_re)) = (
        Regex::new(r"(?s)<item\b.*?</item>"),
        Regex::new(r"(?s)<link>(.*?)</link>"),
        Regex::new(r"(?s)<source\b[^>]*>(.*?)</source>"),
    ) else {
        return HashMap::new();
    };

    let xml = String::from_utf8_lossy(bytes);
    item_re
        .find_iter(&xml)
        .filter_map(|item| {
            let item = item.as_str();
            let link = xml_text(link_re.captures(item)?.get(1)?.as_str());
            let source = xml_text(source_re.captures(item)?.get(1)?.as_str());
            (!link.is_empty() && !source.is_empty()).then_some((link, source))
        })
        .collect()
}

fn xml_text(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("<![CDATA[")
        .and_then(|r| r.strip_suffix("]]>"))
        .unwrap_or(raw);
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Fallback publisher name: the " - Publisher" suffix news aggregators
/// append to titles, else the link host.
fn source_label(title: &str, link: &str) -> String {
    if let Some((_, suffix)) = title.rsplit_once(" - ") {
        let suffix = suffix.trim();
        if !suffix.is_empty() {
            return suffix.to_string();
        }
    }

    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_RSS: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"programmatic advertising" - Google News</title>
    <link>https://news.google.com/</link>
    <description>Google News</description>
    <item>
      <title>Programmatic ad spend up 20% - AdExchanger</title>
      <link>https://news.example.com/articles/1</link>
      <pubDate>Mon, 02 Mar 2026 08:00:00 GMT</pubDate>
      <description>&lt;a href="https://example.com/1"&gt;Programmatic ad spend up 20%&lt;/a&gt;&amp;nbsp;&lt;font color="#6f6f6f"&gt;AdExchanger&lt;/font&gt;</description>
      <source url="https://www.adexchanger.com">AdExchanger</source>
    </item>
    <item>
      <title>CTV budgets keep growing</title>
      <link>https://www.digiday.com/ctv-budgets</link>
      <pubDate>Mon, 02 Mar 2026 07:00:00 GMT</pubDate>
    </item>
    <item>
      <title></title>
      <link>https://news.example.com/untitled</link>
    </item>
    <item>
      <title>Retail media networks mature - Marketing Dive</title>
      <link>https://news.example.com/articles/3</link>
      <pubDate>Sun, 01 Mar 2026 22:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"##;

    #[test]
    fn test_parse_feed_extracts_fields() {
        let items = parse_feed(SAMPLE_RSS.as_bytes(), 10).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Programmatic ad spend up 20% - AdExchanger");
        assert_eq!(items[0].link, "https://news.example.com/articles/1");
        assert_eq!(items[0].source, "AdExchanger");
        assert_eq!(
            items[0].published_at.unwrap().to_rfc3339(),
            "2026-03-02T08:00:00+00:00"
        );
        assert!(items[0].snippet.contains("Programmatic ad spend"));
        assert_eq!(items[1].source, "digiday.com");
        assert!(items[1].snippet.is_empty());
    }

    #[test]
    fn test_parse_feed_applies_limit_after_filtering() {
        let items = parse_feed(SAMPLE_RSS.as_bytes(), 2).unwrap();
        let links: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://news.example.com/articles/1",
                "https://www.digiday.com/ctv-budgets"
            ]
        );
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed(b"not a feed", 3).is_err());
    }

    #[test]
    fn test_source_element_beats_title_suffix() {
        let rss = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title><link>https://n.test</link><description>d</description>
<item><title>Meta Q3 - revenue up</title><link>https://n.test/meta?a=1&amp;b=2</link><source url="https://www.reuters.com">Reuters &amp; Co</source></item>
<item><title>Meta Q3 - revenue up</title><link>https://n.test/plain</link></item>
</channel></rss>"#;

        let items = parse_feed(rss.as_bytes(), 10).unwrap();

        assert_eq!(items[0].link, "https://n.test/meta?a=1&b=2");
        assert_eq!(items[0].source, "Reuters & Co");
        assert_eq!(items[1].source, "revenue up");
    }

    #[test]
    fn test_source_label_fallbacks() {
        assert_eq!(source_label("Headline - Ad Age", "https://x.test/a"), "Ad Age");
        assert_eq!(source_label("Headline", "https://www.adweek.com/a"), "adweek.com");
        assert_eq!(source_label("Headline", "not a url"), "Unknown");
    }

    #[tokio::test]
    async fn test_search_encodes_keyword() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .and(query_param("q", "mobile ad SDK"))
            .and(query_param("ceid", "US:en"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_RSS))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsSearchClient::new(format!("{}/rss/search", server.uri())).unwrap();
        let items = client.search("mobile ad SDK", 1).await.unwrap();

        assert_eq!(items.len(), 1);
        assert!(client
            .search_url("mobile ad SDK")
            .contains("q=mobile%20ad%20SDK"));
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = NewsSearchClient::new(format!("{}/rss/search", server.uri())).unwrap();
        assert!(client.search("anything", 3).await.is_err());
    }
}
