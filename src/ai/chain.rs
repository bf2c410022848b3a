use super::{LanguageModel, ModelOutcome};

/// What the chain produced for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    Reply { model: String, text: String },
    /// A tier rejected the request outright; lower tiers are not tried.
    Failed { model: String, reason: String },
    /// Every tier returned a retryable error.
    Exhausted,
}

/// Model tiers tried in priority order until one answers.
pub struct ModelChain {
    models: Vec<Box<dyn LanguageModel>>,
}

impl ModelChain {
    pub fn new(models: Vec<Box<dyn LanguageModel>>) -> Self {
        Self { models }
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    pub async fn generate(&self, prompt: &str) -> ChainOutcome {
        for model in &self.models {
            match model.generate(prompt).await {
                ModelOutcome::Success(text) => {
                    tracing::debug!("Using model: {}", model.name());
                    return ChainOutcome::Reply {
                        model: model.name().to_string(),
                        text,
                    };
                }
                ModelOutcome::Retryable(reason) => {
                    tracing::info!("{} unavailable ({}), trying next model", model.name(), reason);
                }
                ModelOutcome::Fatal(reason) => {
                    tracing::warn!("{} rejected request: {}", model.name(), reason);
                    return ChainOutcome::Failed {
                        model: model.name().to_string(),
                        reason,
                    };
                }
            }
        }

        tracing::warn!("All models exhausted");
        ChainOutcome::Exhausted
    }
}
