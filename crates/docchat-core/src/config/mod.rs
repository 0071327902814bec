use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::{defaults, endpoints, limits};
use crate::error::ChatError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub llm: LlmSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub documents: DocumentSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSettings {
    /// Display name from the model catalogue.
    pub default_model: String,
    pub api_key_env: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSettings {
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSettings {
    /// Upper bound, in characters, on the excerpt kept per uploaded document.
    pub max_context_chars: usize,
    pub preview_chars: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: defaults::SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            max_context_chars: defaults::MAX_CONTEXT_CHARS,
            preview_chars: defaults::PREVIEW_CHARS,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings {
                default_model: defaults::MODEL.to_string(),
                api_key_env: defaults::API_KEY_ENV.to_string(),
                base_url: endpoints::GROQ_BASE_URL.to_string(),
                temperature: defaults::TEMPERATURE,
                max_tokens: defaults::MAX_TOKENS,
            },
            chat: ChatSettings::default(),
            documents: DocumentSettings::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docchat")
            .join("config.toml")
    }

    /// Load from the default location, falling back to defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let mut settings = Self::load_from(&Self::config_path()).unwrap_or_default();
        settings.apply_env_overrides();
        settings
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparsable settings file");
                None
            }
        }
    }

    pub fn save(&self) -> Result<(), ChatError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Honor `DEFAULT_MODEL`, `DEFAULT_TEMPERATURE` and `DEFAULT_MAX_TOKENS`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var(defaults::MODEL_ENV) {
            if !model.is_empty() {
                self.llm.default_model = model;
            }
        }
        if let Ok(raw) = std::env::var(defaults::TEMPERATURE_ENV) {
            match raw.trim().parse::<f32>() {
                Ok(t) => self.llm.temperature = t,
                Err(_) => warn!(var = defaults::TEMPERATURE_ENV, value = %raw, "ignoring invalid override"),
            }
        }
        if let Ok(raw) = std::env::var(defaults::MAX_TOKENS_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(n) => self.llm.max_tokens = n,
                Err(_) => warn!(var = defaults::MAX_TOKENS_ENV, value = %raw, "ignoring invalid override"),
            }
        }
    }

    /// Get the API key from the environment variable specified in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model: self.llm.default_model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            system_prompt: self.chat.system_prompt.clone(),
        }
    }
}

/// Per-conversation sampling and prompt settings, read fresh on every turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Settings::default().session_config()
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ChatError> {
        check_temperature(self.temperature)?;
        check_max_tokens(self.max_tokens)
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<(), ChatError> {
        check_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<(), ChatError> {
        check_max_tokens(max_tokens)?;
        self.max_tokens = max_tokens;
        Ok(())
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }
}

fn check_temperature(temperature: f32) -> Result<(), ChatError> {
    if (limits::MIN_TEMPERATURE..=limits::MAX_TEMPERATURE).contains(&temperature) {
        Ok(())
    } else {
        Err(ChatError::Config(format!(
            "temperature {temperature} outside [{}, {}]",
            limits::MIN_TEMPERATURE,
            limits::MAX_TEMPERATURE
        )))
    }
}

fn check_max_tokens(max_tokens: u32) -> Result<(), ChatError> {
    if (limits::MIN_MAX_TOKENS..=limits::MAX_MAX_TOKENS).contains(&max_tokens) {
        Ok(())
    } else {
        Err(ChatError::Config(format!(
            "max_tokens {max_tokens} outside [{}, {}]",
            limits::MIN_MAX_TOKENS,
            limits::MAX_MAX_TOKENS
        )))
    }
}
