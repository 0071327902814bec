use crate::llm::{Message, Role};

/// Ordered, append-only log of one conversation.
///
/// Holds at most one system message, and when present it sits at index 0.
/// Messages are never edited after they are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHistory {
    messages: Vec<Message>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. A system message goes through `ensure_system`, so
    /// it is dropped when one already exists.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        match role {
            Role::System => {
                self.ensure_system(content);
            }
            _ => self.messages.push(Message::new(role, content)),
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.append(Role::User, content);
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.append(Role::Assistant, content);
    }

    /// Add a system message unless the history already starts with one.
    /// An existing system message is never replaced, even if `content`
    /// differs. Returns whether a message was added.
    pub fn ensure_system(&mut self, content: impl Into<String>) -> bool {
        if self.has_system() {
            return false;
        }
        self.messages.insert(0, Message::system(content));
        true
    }

    pub fn has_system(&self) -> bool {
        self.messages
            .first()
            .is_some_and(|m| m.role == Role::System)
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Clear, then append each message in order.
    pub fn replay<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        self.messages.clear();
        for message in messages {
            self.append(message.role, message.content);
        }
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::User)
    }

    /// Rough size of the history in tokens (4 characters per token).
    pub fn estimate_tokens(&self) -> usize {
        self.messages
            .iter()
            .map(|m| m.content.chars().count() / 4)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_system_invariant(history: &MessageHistory) {
        let systems: Vec<usize> = history
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == Role::System)
            .map(|(i, _)| i)
            .collect();
        assert!(systems.is_empty() || systems == vec![0], "system at {systems:?}");
    }

    #[test]
    fn test_append_preserves_order() {
        let mut history = MessageHistory::new();
        history.add_user_message("Hello");
        history.add_assistant_message("Hi there!");
        history.append(Role::User, "");

        let contents: Vec<&str> = history.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Hello", "Hi there!", ""]);
    }

    #[test]
    fn test_ensure_system_is_idempotent() {
        let mut history = MessageHistory::new();
        assert!(history.ensure_system("first"));
        assert!(!history.ensure_system("second"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.system_prompt(), Some("first"));
    }

    #[test]
    fn test_ensure_system_goes_first_on_existing_history() {
        let mut history = MessageHistory::new();
        history.add_user_message("hi");
        history.add_assistant_message("hello");
        assert!(history.ensure_system("sys"));

        assert_eq!(history.messages()[0], Message::system("sys"));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_system_invariant_over_mixed_sequence() {
        let mut history = MessageHistory::new();
        let ops: [(Role, &str); 7] = [
            (Role::User, "u1"),
            (Role::System, "s1"),
            (Role::Assistant, "a1"),
            (Role::System, "s2"),
            (Role::User, "u2"),
            (Role::System, "s3"),
            (Role::Assistant, "a2"),
        ];
        for (role, content) in ops {
            history.append(role, content);
            assert_system_invariant(&history);
        }
        history.ensure_system("s4");
        assert_system_invariant(&history);
        assert_eq!(history.system_prompt(), Some("s1"));
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_replay_replaces_contents() {
        let mut history = MessageHistory::new();
        history.add_user_message("old");

        history.replay(vec![
            Message::system("sys"),
            Message::user("q"),
            Message::assistant("a"),
        ]);

        assert_eq!(
            history.messages(),
            &[Message::system("sys"), Message::user("q"), Message::assistant("a")]
        );
    }

    #[test]
    fn test_reset_clears() {
        let mut history = MessageHistory::new();
        history.ensure_system("sys");
        history.add_user_message("hi");
        history.reset();
        assert!(history.is_empty());
        assert!(history.first_user_message().is_none());
    }

    #[test]
    fn test_estimate_tokens() {
        let mut history = MessageHistory::new();
        history.add_user_message("a".repeat(40));
        history.add_assistant_message("b".repeat(8));
        assert_eq!(history.estimate_tokens(), 12);
    }
}
