use regex::Regex;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Fields asked of the model for a single article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryReply {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub summary_ko: String,
    #[serde(default)]
    pub title_ko: Option<String>,
}

/// Fields asked of the model for a daily digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DigestReply {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub summary_ko: String,
}

/// The span from the first `{` to the last `}`, which is where models put
/// the JSON when they wrap it in prose or code fences.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\{.*\}").ok()?;
    re.find(text).map(|m| m.as_str())
}

pub fn parse_summary_reply(text: &str) -> Result<SummaryReply> {
    let json = extract_json_object(text)
        .ok_or_else(|| AppError::ModelApi("no JSON object in reply".to_string()))?;
    let reply: SummaryReply = serde_json::from_str(json)?;
    if reply.summary.trim().is_empty() {
        return Err(AppError::ModelApi("reply has no summary".to_string()));
    }
    Ok(reply)
}

/// Strict JSON first, then a field-by-field scrape of a truncated or
/// malformed reply. `None` when not even an English summary is found.
pub fn parse_digest_reply(text: &str) -> Option<DigestReply> {
    if let Some(json) = extract_json_object(text) {
        match serde_json::from_str::<DigestReply>(json) {
            Ok(reply) if !reply.summary.is_empty() => return Some(reply),
            Ok(_) => {}
            Err(e) => tracing::debug!("Digest reply is not valid JSON: {}", e),
        }
    }

    let summary = scrape_string_field(text, "summary")?;
    let summary_ko = scrape_string_field(text, "summary_ko").unwrap_or_default();
    Some(DigestReply {
        summary,
        summary_ko,
    })
}

fn scrape_string_field(text: &str, field: &str) -> Option<String> {
    let pattern = format!(r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)""#, regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(text)?.get(1)?.as_str();
    let value = serde_json::from_str::<String>(&format!("\"{}\"", raw))
        .unwrap_or_else(|_| raw.to_string());
    Some(value).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_reply() {
        let text = "Sure!\n```json\n{\"summary\": \"A\", \"nested\": {\"x\": 1}}\n```";
        assert_eq!(
            extract_json_object(text),
            Some("{\"summary\": \"A\", \"nested\": {\"x\": 1}}")
        );
        assert_eq!(extract_json_object("no braces here"), None);
    }

    #[test]
    fn test_parse_summary_reply() {
        let reply = parse_summary_reply(
            r#"{"summary": "Ad spend rose.", "summary_ko": "광고비가 늘었다.", "title_ko": "광고비 증가"}"#,
        )
        .unwrap();
        assert_eq!(reply.summary, "Ad spend rose.");
        assert_eq!(reply.title_ko.as_deref(), Some("광고비 증가"));
    }

    #[test]
    fn test_parse_summary_reply_failures() {
        assert!(parse_summary_reply("I cannot help with that.").is_err());
        assert!(parse_summary_reply("{\"summary\": \"cut off").is_err());
        assert!(parse_summary_reply("{\"summary_ko\": \"only korean\"}").is_err());
    }

    #[test]
    fn test_parse_digest_reply_strict() {
        let reply =
            parse_digest_reply(r#"{"summary": "CTV led the day.", "summary_ko": "CTV가 주도했다."}"#)
                .unwrap();
        assert_eq!(reply.summary, "CTV led the day.");
        assert_eq!(reply.summary_ko, "CTV가 주도했다.");
    }

    #[test]
    fn test_parse_digest_reply_scrapes_truncated_json() {
        let text = r#"{"summary": "Retail media \"boomed\" today.", "summary_ko": "리테일"#;
        let reply = parse_digest_reply(text).unwrap();
        assert_eq!(reply.summary, "Retail media \"boomed\" today.");
        assert_eq!(reply.summary_ko, "");
    }

    #[test]
    fn test_parse_digest_reply_nothing_usable() {
        assert_eq!(parse_digest_reply("The model refused."), None);
    }
}
