use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Model {0} not found in available models")]
    UnknownModel(String),

    #[error("No API key available: pass one explicitly or set {0}")]
    MissingApiKey(String),

    #[error("Model not initialized. Call initialize first.")]
    NotInitialized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatError {
    /// Configuration errors are reported to the caller and never retried.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownModel(_) | Self::MissingApiKey(_) | Self::NotInitialized | Self::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
