mod chain;
mod gemini;
pub mod prompt;
mod reply;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

pub use chain::{ChainOutcome, ModelChain};
pub use gemini::GeminiModel;
pub use reply::{parse_digest_reply, parse_summary_reply, DigestReply};

/// Result of a single model call, classified for the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutcome {
    /// Free-text reply from the model.
    Success(String),
    /// Quota, rate limit, transport or server error; the next tier may succeed.
    Retryable(String),
    /// The request itself is bad; other tiers would fail the same way.
    Fatal(String),
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> ModelOutcome;
}
