pub mod error;
pub mod constants;
pub mod config;
pub mod llm;
pub mod document;
pub mod context;
pub mod session;

// Re-export key types
pub use error::ChatError;
pub use config::{SessionConfig, Settings};
pub use llm::{Completion, Connector, LlmAdapter, LlmClient, LlmResponse, Message, Role, SamplingParams};
pub use document::{DocumentIngestor, DocumentKind, DocumentSet, Extraction, IngestedDocument};
pub use context::{ConversationLibrary, ConversationSnapshot, MessageHistory, PromptAssembler};
pub use session::Session;
