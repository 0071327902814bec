use crate::config::SessionConfig;
use crate::constants::{conversation, markers};
use crate::error::ChatError;
use crate::llm::{Message, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A detached copy of one conversation: its messages plus the settings
/// they were produced with.
///
/// Serializes as a flat record:
/// `id, title, timestamp, messages[{role, content}], model, temperature,
/// max_tokens, system_prompt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub id: String,
    pub title: String,
    pub timestamp: String,
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub config: SessionConfig,
}

impl ConversationSnapshot {
    /// Snapshot stamped with the current local time.
    pub fn new(id: impl Into<String>, messages: Vec<Message>, config: SessionConfig) -> Self {
        Self::with_timestamp(id, messages, config, current_timestamp())
    }

    pub fn with_timestamp(
        id: impl Into<String>,
        messages: Vec<Message>,
        config: SessionConfig,
        timestamp: impl Into<String>,
    ) -> Self {
        let timestamp = timestamp.into();
        Self {
            id: id.into(),
            title: derive_title(&messages, &timestamp),
            timestamp,
            messages,
            config,
        }
    }

    pub fn to_json(&self) -> Result<String, ChatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ChatError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Suggested download name, e.g. `conversation_2024-05-01_13-45-00.json`.
    pub fn file_name(&self) -> String {
        format!(
            "conversation_{}.json",
            self.timestamp.replace(':', "-").replace(' ', "_")
        )
    }

    /// Messages must satisfy the history invariant: at most one system
    /// message, and only at index 0.
    pub fn validate(&self) -> Result<(), ChatError> {
        self.config.validate()?;
        let misplaced = self
            .messages
            .iter()
            .enumerate()
            .any(|(i, m)| m.role == Role::System && i != 0);
        if misplaced {
            return Err(ChatError::Config(format!(
                "conversation {} has a system message after the first position",
                self.id
            )));
        }
        Ok(())
    }
}

/// Local time formatted as `%Y-%m-%d %H:%M:%S`.
pub fn current_timestamp() -> String {
    chrono::Local::now()
        .format(conversation::TIMESTAMP_FORMAT)
        .to_string()
}

/// First user message cut to 40 characters (with an ellipsis when longer),
/// or `"Conversation <timestamp>"` when there is no user message.
pub fn derive_title(messages: &[Message], timestamp: &str) -> String {
    match messages.iter().find(|m| m.role == Role::User) {
        Some(first) => {
            let mut title: String = first
                .content
                .chars()
                .take(conversation::TITLE_MAX_CHARS)
                .collect();
            if first.content.chars().count() > conversation::TITLE_MAX_CHARS {
                title.push_str(markers::TITLE_ELLIPSIS);
            }
            title
        }
        None => format!("{}{}", conversation::FALLBACK_TITLE_PREFIX, timestamp),
    }
}

/// Saved conversations for the lifetime of the process, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ConversationLibrary {
    conversations: HashMap<String, ConversationSnapshot>,
}

impl ConversationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot, replacing any earlier one with the same id.
    pub fn save(&mut self, snapshot: ConversationSnapshot) {
        self.conversations.insert(snapshot.id.clone(), snapshot);
    }

    pub fn get(&self, id: &str) -> Option<&ConversationSnapshot> {
        self.conversations.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<ConversationSnapshot> {
        self.conversations.remove(id)
    }

    /// Most recent first.
    pub fn list(&self) -> Vec<&ConversationSnapshot> {
        let mut list: Vec<&ConversationSnapshot> = self.conversations.values().collect();
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        list
    }

    /// Case-insensitive title search, most recent first.
    pub fn search(&self, query: &str) -> Vec<&ConversationSnapshot> {
        let query = query.to_lowercase();
        self.list()
            .into_iter()
            .filter(|s| s.title.to_lowercase().contains(&query))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
