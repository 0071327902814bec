mod history;
mod assembler;
pub mod snapshot;

pub use history::MessageHistory;
pub use assembler::{context_block, PromptAssembler};
pub use snapshot::{ConversationLibrary, ConversationSnapshot};
