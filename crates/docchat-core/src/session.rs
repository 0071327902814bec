use crate::config::{SessionConfig, Settings};
use crate::context::{ConversationLibrary, ConversationSnapshot, MessageHistory, PromptAssembler};
use crate::document::{DocumentIngestor, DocumentSet, IngestedDocument};
use crate::error::ChatError;
use crate::llm::{Completion, LlmAdapter};
use tracing::info;
use uuid::Uuid;

/// One conversation and everything it needs for a turn: history, active
/// documents, settings and the model adapter.
///
/// A session is owned by a single caller. Every mutating operation takes
/// `&mut self`, so at most one turn is ever in flight; hosts serving
/// several users keep one `Session` per conversation.
pub struct Session {
    id: String,
    config: SessionConfig,
    history: MessageHistory,
    documents: DocumentSet,
    ingestor: DocumentIngestor,
    adapter: LlmAdapter,
}

impl Session {
    pub fn new(adapter: LlmAdapter, config: SessionConfig) -> Self {
        Self {
            id: new_conversation_id(),
            config,
            history: MessageHistory::new(),
            documents: DocumentSet::new(),
            ingestor: DocumentIngestor::default(),
            adapter,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(LlmAdapter::from_settings(settings), settings.session_config())
            .with_ingestor(DocumentIngestor::new(settings.documents.max_context_chars))
    }

    pub fn with_ingestor(mut self, ingestor: DocumentIngestor) -> Self {
        self.ingestor = ingestor;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Changes apply from the next turn on.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn adapter(&self) -> &LlmAdapter {
        &self.adapter
    }

    pub fn ingestor(&self) -> &DocumentIngestor {
        &self.ingestor
    }

    pub fn is_ready(&self) -> bool {
        self.adapter.is_ready()
    }

    /// Bind the adapter to `model_name`. On success the session config
    /// records the model; on failure nothing changes.
    pub fn initialize(&mut self, model_name: &str, api_token: Option<&str>) -> Result<(), ChatError> {
        self.adapter.initialize(model_name, api_token)?;
        self.config.set_model(model_name);
        Ok(())
    }

    /// Run one turn.
    ///
    /// Fails with `NotInitialized`, leaving history untouched, when no model
    /// is bound. Otherwise the context-augmented user message and the reply
    /// are both recorded; a generation failure is recorded as the assistant
    /// reply in its in-band text form and returned as `Completion::Failed`.
    pub async fn send(&mut self, user_input: &str) -> Result<Completion, ChatError> {
        if !self.adapter.is_ready() {
            return Err(ChatError::NotInitialized);
        }

        let messages = PromptAssembler::new(&self.config.system_prompt)
            .with_documents(&self.documents)
            .build(&mut self.history, user_input);

        let completion = self
            .adapter
            .complete(&messages, self.config.temperature, self.config.max_tokens)
            .await?;

        self.history.add_assistant_message(completion.text());
        Ok(completion)
    }

    /// Start a new conversation. Active documents stay attached.
    pub fn reset(&mut self) {
        self.history.reset();
        self.adapter.reset();
        self.id = new_conversation_id();
        info!(conversation = %self.id, documents = self.documents.len(), "conversation reset");
    }

    pub fn export(&self) -> ConversationSnapshot {
        ConversationSnapshot::new(
            self.id.clone(),
            self.history.messages().to_vec(),
            self.config.clone(),
        )
    }

    /// Adopt a snapshot's id, config and messages. Active documents are not
    /// part of a snapshot and stay as they are. A snapshot that fails
    /// validation leaves the session unchanged.
    pub fn import(&mut self, snapshot: ConversationSnapshot) -> Result<(), ChatError> {
        snapshot.validate()?;

        let ConversationSnapshot {
            id,
            messages,
            config,
            ..
        } = snapshot;

        self.adapter.reset();
        self.history.replay(messages);
        self.config = config;
        self.id = id;
        info!(conversation = %self.id, messages = self.history.len(), "conversation imported");
        Ok(())
    }

    /// Export into `library`, returning the stored conversation id.
    pub fn save_to(&self, library: &mut ConversationLibrary) -> String {
        let snapshot = self.export();
        let id = snapshot.id.clone();
        library.save(snapshot);
        id
    }

    pub fn load_from(&mut self, library: &ConversationLibrary, id: &str) -> Result<(), ChatError> {
        let snapshot = library
            .get(id)
            .cloned()
            .ok_or_else(|| ChatError::Config(format!("Conversation not found: {id}")))?;
        self.import(snapshot)
    }

    /// Extract, condense and activate an uploaded document. The excerpt is
    /// stored even when extraction failed; check the returned outcome.
    pub fn add_document(&mut self, name: &str, blob: &[u8]) -> IngestedDocument {
        let doc = self.ingestor.ingest(name, blob);
        self.documents.insert(doc.name.clone(), doc.excerpt.clone());
        doc
    }

    /// Activate already-extracted text under `name`, condensed to the
    /// ingestor's bound.
    pub fn insert_document(&mut self, name: impl Into<String>, text: &str) {
        let excerpt = crate::document::condense(text, self.ingestor.max_context_chars());
        self.documents.insert(name, excerpt);
    }

    pub fn remove_document(&mut self, name: &str) -> Option<String> {
        self.documents.remove(name)
    }

    pub fn clear_documents(&mut self) {
        self.documents.clear();
    }
}

fn new_conversation_id() -> String {
    Uuid::new_v4().to_string()
}
