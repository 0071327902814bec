/// Centralized constants for DocChat.
/// Markers, bounds, defaults and the model catalogue live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    /// Display names offered to the user.
    pub const LLAMA2_70B: &str = "Llama2-70b";
    pub const MIXTRAL_8X7B: &str = "Mixtral 8x7B";
    pub const LLAMA3_8B: &str = "Llama3-8b";

    /// Provider model ids (Groq).
    pub const LLAMA2_70B_ID: &str = "llama2-70b-4096";
    pub const MIXTRAL_8X7B_ID: &str = "mixtral-8x7b-32768";
    pub const LLAMA3_8B_ID: &str = "llama3-8b-8192";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const MODEL: &str = super::models::LLAMA3_8B;
    pub const API_KEY_ENV: &str = "GROQ_API_KEY";
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 1024;
    pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
    pub const MAX_CONTEXT_CHARS: usize = 5000;
    pub const PREVIEW_CHARS: usize = 500;
    pub const CHUNK_SIZE: usize = 1000;
    pub const CHUNK_OVERLAP: usize = 200;

    /// Environment overrides read by `Settings::apply_env_overrides`.
    pub const MODEL_ENV: &str = "DEFAULT_MODEL";
    pub const TEMPERATURE_ENV: &str = "DEFAULT_TEMPERATURE";
    pub const MAX_TOKENS_ENV: &str = "DEFAULT_MAX_TOKENS";
}

// ─── Sampling Bounds ──────────────────────────────────────────────────────────

pub mod limits {
    pub const MIN_TEMPERATURE: f32 = 0.0;
    pub const MAX_TEMPERATURE: f32 = 1.0;
    pub const MIN_MAX_TOKENS: u32 = 64;
    pub const MAX_MAX_TOKENS: u32 = 4096;
}

// ─── In-band Markers ──────────────────────────────────────────────────────────

pub mod markers {
    pub const UNSUPPORTED_FORMAT: &str = "Unsupported file format";
    pub const TRUNCATED: &str = "... [text truncated]";
    pub const PREVIEW_ELLIPSIS: &str = "...";
    pub const TITLE_ELLIPSIS: &str = "...";
    pub const GENERATION_ERROR_PREFIX: &str = "Error generating response: ";
    pub const CONTEXT_HEADER: &str = "\nContext information:\n";
}

// ─── Conversations ────────────────────────────────────────────────────────────

pub mod conversation {
    pub const TITLE_MAX_CHARS: usize = 40;
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    pub const FALLBACK_TITLE_PREFIX: &str = "Conversation ";
}
