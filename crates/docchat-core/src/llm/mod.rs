mod traits;
mod openai;
pub mod adapter;
pub mod catalog;

pub use traits::*;
pub use openai::{OpenAiCompatClient, OpenAiCompatConnector};
pub use adapter::{Completion, LlmAdapter};
pub use catalog::{ModelCatalog, ModelInfo, UsageTracker};
