//! Prompt templates sent to the language model.

use crate::models::PublishedNewsItem;

pub fn article_summary(title: &str) -> String {
    format!(
        r#"You are a news summarizer for the advertising industry.

Given this news headline: "{}"

Please provide:
1. A concise 1-2 sentence summary in English
2. The same summary translated to Korean
3. The title translated to Korean

Respond in this exact JSON format:
{{
  "summary": "English summary here",
  "summary_ko": "Korean summary here",
  "title_ko": "Korean title here"
}}"#,
        title
    )
}

/// Numbered list of the day's stories, as fed to the digest prompt.
pub fn digest_listing(items: &[PublishedNewsItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. [{}] {}\n   {}",
                i + 1,
                item.category.to_uppercase(),
                item.title,
                item.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn daily_digest(items: &[PublishedNewsItem]) -> String {
    format!(
        r#"You are an ad industry analyst creating a daily digest.

Here are today's top ad industry news stories:

{}

Create a concise daily digest (2-3 sentences) that summarizes the key themes and most important developments in the ad industry today. Focus on trends and significant news.

Respond in this exact JSON format:
{{
  "summary": "English summary here (2-3 sentences)",
  "summary_ko": "Korean translation of the summary"
}}"#,
        digest_listing(items)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_article_prompt_embeds_title() {
        let prompt = article_summary("CTV ad spend doubles");
        assert!(prompt.contains("\"CTV ad spend doubles\""));
        assert!(prompt.contains("\"title_ko\""));
    }

    #[test]
    fn test_digest_listing_format() {
        let item = |title: &str, category: &str| PublishedNewsItem {
            id: 1,
            title: title.to_string(),
            title_ko: String::new(),
            summary: format!("About {}.", title),
            summary_ko: String::new(),
            category: category.to_string(),
            source: "Wire".to_string(),
            source_url: format!("https://x.test/{}", title),
            published_at: Utc::now(),
            created_at: Utc::now(),
        };

        let listing = digest_listing(&[item("A", "adtech"), item("B", "martech")]);

        assert_eq!(listing, "1. [ADTECH] A\n   About A.\n\n2. [MARTECH] B\n   About B.");
    }
}
