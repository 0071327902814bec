use crate::config::Settings;
use crate::constants::{defaults, markers};
use crate::error::ChatError;
use crate::llm::catalog::{ModelCatalog, ModelInfo, UsageTracker};
use crate::llm::openai::OpenAiCompatConnector;
use crate::llm::traits::*;
use tracing::{info, warn};

/// Outcome of one generation attempt.
///
/// Provider and transport failures do not surface as `Err`; they become
/// `Failed` so the caller can still record the turn. `text()` renders the
/// same string in both cases as the chat transcript shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Reply(String),
    Failed(String),
}

impl Completion {
    pub fn is_reply(&self) -> bool {
        matches!(self, Completion::Reply(_))
    }

    pub fn text(&self) -> String {
        match self {
            Completion::Reply(content) => content.clone(),
            Completion::Failed(detail) => format!("{}{}", markers::GENERATION_ERROR_PREFIX, detail),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Completion::Reply(content) => content,
            failed => failed.text(),
        }
    }
}

enum AdapterState {
    Uninitialized,
    Ready {
        model: ModelInfo,
        client: Box<dyn LlmClient>,
    },
}

/// Uniform front for the chat-completion provider.
///
/// Starts `Uninitialized`; a successful `initialize` moves it to `Ready`
/// and it never falls back on its own. A failed `initialize` leaves the
/// previous state in place.
pub struct LlmAdapter {
    catalog: ModelCatalog,
    connector: Box<dyn Connector>,
    api_key_env: String,
    default_api_key: Option<String>,
    state: AdapterState,
    usage: UsageTracker,
}

impl LlmAdapter {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            catalog: ModelCatalog::new(),
            connector,
            api_key_env: defaults::API_KEY_ENV.to_string(),
            default_api_key: None,
            state: AdapterState::Uninitialized,
            usage: UsageTracker::default(),
        }
    }

    /// Adapter wired to the configured endpoint, with the credential read
    /// once from the environment variable named in settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let connector = OpenAiCompatConnector::new(&settings.llm.base_url);
        Self::new(Box::new(connector))
            .with_api_key_env(&settings.llm.api_key_env)
            .with_default_api_key(settings.api_key())
    }

    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_api_key_env(mut self, env: impl Into<String>) -> Self {
        self.api_key_env = env.into();
        self
    }

    pub fn with_default_api_key(mut self, key: Option<String>) -> Self {
        self.default_api_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn initialize(&mut self, model_name: &str, api_token: Option<&str>) -> Result<(), ChatError> {
        let model = self
            .catalog
            .resolve(model_name)
            .cloned()
            .ok_or_else(|| ChatError::UnknownModel(model_name.to_string()))?;

        let api_key = api_token
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_api_key.clone())
            .ok_or_else(|| ChatError::MissingApiKey(self.api_key_env.clone()))?;

        let client = self.connector.connect(&model.id, &api_key)?;

        info!(model = %model.name, model_id = %model.id, "LLM adapter ready");
        self.state = AdapterState::Ready { model, client };
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, AdapterState::Ready { .. })
    }

    /// The model selected by the last successful `initialize`.
    pub fn model(&self) -> Option<&ModelInfo> {
        match &self.state {
            AdapterState::Ready { model, .. } => Some(model),
            AdapterState::Uninitialized => None,
        }
    }

    /// Run one chat completion. The only `Err` is `NotInitialized`; provider
    /// failures come back as `Completion::Failed`. No retry.
    pub async fn complete(
        &mut self,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, ChatError> {
        let AdapterState::Ready { model, client } = &self.state else {
            return Err(ChatError::NotInitialized);
        };

        let params = SamplingParams {
            temperature,
            max_tokens,
        };

        match client.chat(messages, &params).await {
            Ok(response) => {
                if let Some(usage) = response.usage {
                    self.usage.track(usage.input_tokens, usage.output_tokens);
                }
                Ok(Completion::Reply(response.content))
            }
            Err(e) => {
                warn!(model = %model.name, error = %e, "generation failed");
                Ok(Completion::Failed(e.to_string()))
            }
        }
    }

    /// Drop conversation-scoped state. The provider binding stays `Ready`.
    pub fn reset(&mut self) {
        self.usage.reset();
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }
}
