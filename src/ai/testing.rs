//! Scripted model for exercising the pipeline without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{LanguageModel, ModelOutcome};

#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Replays queued outcomes in order. Once the queue is empty every call is
/// answered as a quota error.
pub struct ScriptedModel {
    name: String,
    script: Mutex<VecDeque<ModelOutcome>>,
    calls: CallCounter,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new(name: &str, script: Vec<ModelOutcome>) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(script.into()),
            calls: CallCounter::default(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replies with `text` for each entry.
    pub fn replying(name: &str, texts: &[&str]) -> Self {
        Self::new(
            name,
            texts
                .iter()
                .map(|t| ModelOutcome::Success(t.to_string()))
                .collect(),
        )
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> ModelOutcome {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ModelOutcome::Retryable("quota exhausted".to_string()))
    }
}
