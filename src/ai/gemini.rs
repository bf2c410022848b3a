use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{LanguageModel, ModelOutcome};

const TEMPERATURE: f32 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
}

/// One Gemini model tier behind the `generateContent` endpoint.
pub struct GeminiModel {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiModel {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn http_client() -> Result<Client> {
        Ok(Client::builder().timeout(Duration::from_secs(60)).build()?)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> ModelOutcome {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = match self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ModelOutcome::Retryable(format!("request failed: {}", e)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ModelOutcome::Retryable(format!("failed to read body: {}", e)),
        };

        let parsed: GenerateResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return classify_status(status, format!("HTTP {}", status));
            }
            Err(e) => return ModelOutcome::Fatal(format!("malformed response: {}", e)),
        };

        if let Some(error) = parsed.error {
            let code = error
                .code
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(status);
            let detail = error
                .status
                .clone()
                .or(error.message)
                .unwrap_or_else(|| format!("HTTP {}", code));
            if error.status.as_deref().is_some_and(is_tier_local_status) {
                return ModelOutcome::Retryable(detail);
            }
            return classify_status(code, detail);
        }

        if !status.is_success() {
            return classify_status(status, format!("HTTP {}", status));
        }

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return ModelOutcome::Fatal("no candidates in response".to_string());
        };
        tracing::debug!(
            model = %self.model,
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Model reply received"
        );

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        ModelOutcome::Success(text)
    }
}

/// Errors that belong to one model tier: quota, a missing or retired model,
/// or an outage. Another tier may still answer.
fn is_tier_local_status(status: &str) -> bool {
    matches!(
        status,
        "RESOURCE_EXHAUSTED" | "NOT_FOUND" | "FAILED_PRECONDITION" | "UNAVAILABLE"
    )
}

/// Bad keys and malformed requests fail the same way on every tier.
fn classify_status(status: StatusCode, detail: String) -> ModelOutcome {
    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::NOT_FOUND
        || status.is_server_error()
    {
        ModelOutcome::Retryable(detail)
    } else {
        ModelOutcome::Fatal(detail)
    }
}
