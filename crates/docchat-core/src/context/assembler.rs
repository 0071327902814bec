use crate::constants::markers;
use crate::context::MessageHistory;
use crate::document::DocumentSet;
use crate::llm::Message;
use tracing::debug;

/// Builds the message sequence sent to the model for one turn.
pub struct PromptAssembler<'a> {
    system_prompt: &'a str,
    documents: Option<&'a DocumentSet>,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(system_prompt: &'a str) -> Self {
        Self {
            system_prompt,
            documents: None,
        }
    }

    pub fn with_documents(mut self, documents: &'a DocumentSet) -> Self {
        self.documents = Some(documents);
        self
    }

    /// The user message as it will be stored: context block, then input.
    pub fn effective_input(&self, user_input: &str) -> String {
        match self.documents {
            Some(docs) if !docs.is_empty() => {
                let mut message = context_block(docs);
                message.push_str(user_input);
                message
            }
            _ => user_input.to_string(),
        }
    }

    /// Make sure the history starts with a system message, record the
    /// context-augmented user message, and return the whole history.
    ///
    /// The stored user message keeps its injected context, so later turns
    /// see it as ordinary history. A system message already present is left
    /// as is even if `system_prompt` has changed since.
    pub fn build(&self, history: &mut MessageHistory, user_input: &str) -> Vec<Message> {
        history.ensure_system(self.system_prompt);

        let effective = self.effective_input(user_input);
        debug!(
            documents = self.documents.map_or(0, DocumentSet::len),
            context_chars = effective.chars().count() - user_input.chars().count(),
            history_len = history.len() + 1,
            "assembled prompt"
        );
        history.add_user_message(effective);

        history.messages().to_vec()
    }
}

/// `"\nContext information:\n"` followed by one `"From <name>:\n<text>\n\n"`
/// section per document in name order. Empty when there are no documents.
pub fn context_block(documents: &DocumentSet) -> String {
    if documents.is_empty() {
        return String::new();
    }

    let mut block = String::from(markers::CONTEXT_HEADER);
    for (name, text) in documents.iter() {
        block.push_str(&format!("From {name}:\n{text}\n\n"));
    }
    block
}
