use crate::constants::models;
use serde::{Deserialize, Serialize};

/// Info about a model offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Display name, e.g. "Llama3-8b".
    pub name: String,
    /// Provider model id sent on the wire.
    pub id: String,
    pub context_window: usize,
}

/// The fixed set of supported models.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelCatalog {
    pub fn new() -> Self {
        let entry = |name: &str, id: &str, context_window: usize| ModelInfo {
            name: name.into(),
            id: id.into(),
            context_window,
        };
        Self {
            models: vec![
                entry(models::LLAMA2_70B, models::LLAMA2_70B_ID, 4096),
                entry(models::MIXTRAL_8X7B, models::MIXTRAL_8X7B_ID, 32_768),
                entry(models::LLAMA3_8B, models::LLAMA3_8B_ID, 8192),
            ],
        }
    }

    pub fn from_models(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    /// Look up a model by display name.
    pub fn resolve(&self, name: &str) -> Option<&ModelInfo> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }
}

/// Token usage accumulated across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageTracker {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub request_count: u64,
}

impl UsageTracker {
    pub fn track(&mut self, input: u32, output: u32) {
        self.total_input_tokens += input as u64;
        self.total_output_tokens += output as u64;
        self.request_count += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
