use docchat_core::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    calls: Vec<(Vec<Message>, SamplingParams)>,
}

/// Mock LLM that pops pre-programmed replies; `Err` entries simulate
/// provider failures.
struct MockLlm {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    recorded: Arc<Mutex<Recorded>>,
}

#[async_trait::async_trait]
impl LlmClient for MockLlm {
    async fn chat(
        &self,
        messages: &[Message],
        params: &SamplingParams,
    ) -> Result<LlmResponse, ChatError> {
        self.recorded
            .lock()
            .unwrap()
            .calls
            .push((messages.to_vec(), *params));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(LlmResponse {
                content,
                usage: None,
            }),
            Some(Err(detail)) => Err(ChatError::Llm(detail)),
            None => Ok(LlmResponse {
                content: "Mock response".into(),
                usage: None,
            }),
        }
    }
}

struct MockConnector {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl Connector for MockConnector {
    fn connect(&self, _model_id: &str, _api_key: &str) -> Result<Box<dyn LlmClient>, ChatError> {
        Ok(Box::new(MockLlm {
            replies: self.replies.clone(),
            recorded: self.recorded.clone(),
        }))
    }
}

fn session_with(replies: Vec<Result<&str, &str>>) -> (Session, Arc<Mutex<Recorded>>) {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let replies = replies
        .into_iter()
        .map(|r| r.map(str::to_string).map_err(str::to_string))
        .collect();
    let connector = MockConnector {
        replies: Arc::new(Mutex::new(replies)),
        recorded: recorded.clone(),
    };
    let adapter = LlmAdapter::new(Box::new(connector));
    (Session::new(adapter, SessionConfig::default()), recorded)
}

fn ready_session(replies: Vec<Result<&str, &str>>) -> (Session, Arc<Mutex<Recorded>>) {
    let (mut session, recorded) = session_with(replies);
    session.initialize("Llama3-8b", Some("test-key")).unwrap();
    (session, recorded)
}

// ========================================================================
// Initialization
// ========================================================================

#[tokio::test]
async fn test_send_before_initialize_fails_without_mutation() {
    let (mut session, recorded) = session_with(vec![Ok("never")]);

    let err = session.send("hello").await.unwrap_err();

    assert!(matches!(err, ChatError::NotInitialized));
    assert!(err.is_config());
    assert!(session.history().is_empty());
    assert!(recorded.lock().unwrap().calls.is_empty());
}

#[test]
fn test_initialize_records_model_in_config() {
    let (mut session, _) = session_with(vec![]);
    session.initialize("Mixtral 8x7B", Some("key")).unwrap();
    assert_eq!(session.config().model, "Mixtral 8x7B");
    assert!(session.is_ready());
}

#[test]
fn test_failed_initialize_changes_nothing() {
    let (mut session, _) = session_with(vec![]);
    let before = session.config().clone();

    assert!(session.initialize("Unknown", Some("key")).is_err());
    assert!(session.initialize("Llama3-8b", None).is_err());

    assert!(!session.is_ready());
    assert_eq!(session.config(), &before);
}

// ========================================================================
// Turns
// ========================================================================

#[tokio::test]
async fn test_send_records_turn_and_forwards_full_history() {
    let (mut session, recorded) = ready_session(vec![Ok("Hi!"), Ok("Fine.")]);

    let first = session.send("Hello").await.unwrap();
    assert_eq!(first, Completion::Reply("Hi!".into()));

    session.config_mut().set_temperature(0.2).unwrap();
    session.config_mut().set_max_tokens(256).unwrap();
    let second = session.send("How are you?").await.unwrap();
    assert_eq!(second.text(), "Fine.");

    let expected = vec![
        Message::system("You are a helpful assistant."),
        Message::user("Hello"),
        Message::assistant("Hi!"),
        Message::user("How are you?"),
        Message::assistant("Fine."),
    ];
    assert_eq!(session.history().messages(), expected.as_slice());

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.calls.len(), 2);
    assert_eq!(recorded.calls[0].0, expected[..2].to_vec());
    assert_eq!(recorded.calls[1].0, expected[..4].to_vec());
    assert_eq!(recorded.calls[0].1, SamplingParams { temperature: 0.7, max_tokens: 1024 });
    assert_eq!(recorded.calls[1].1, SamplingParams { temperature: 0.2, max_tokens: 256 });
}

#[tokio::test]
async fn test_failed_generation_is_recorded_as_assistant_turn() {
    let (mut session, _) = ready_session(vec![Err("connection reset"), Ok("back")]);

    let completion = session.send("Hello").await.unwrap();
    assert!(!completion.is_reply());
    assert_eq!(
        completion.text(),
        "Error generating response: LLM error: connection reset"
    );

    let messages = session.history().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].content, completion.text());

    // The session stays usable for the next turn.
    let next = session.send("again").await.unwrap();
    assert_eq!(next, Completion::Reply("back".into()));
    assert_eq!(session.history().len(), 5);
}

#[tokio::test]
async fn test_documents_are_injected_into_stored_user_message() {
    let (mut session, recorded) = ready_session(vec![Ok("ok"), Ok("ok")]);
    session.add_document("b.txt", b"Y");
    session.add_document("a.txt", b"X");

    session.send("hi").await.unwrap();

    let expected = "\nContext information:\nFrom a.txt:\nX\n\nFrom b.txt:\nY\n\nhi";
    assert_eq!(session.history().messages()[1].content, expected);
    assert_eq!(recorded.lock().unwrap().calls[0].0[1].content, expected);

    session.clear_documents();
    session.send("plain").await.unwrap();
    assert_eq!(session.history().messages()[3].content, "plain");
}

#[tokio::test]
async fn test_edited_system_prompt_does_not_affect_running_conversation() {
    let (mut session, recorded) = ready_session(vec![Ok("one"), Ok("two")]);
    session.send("first").await.unwrap();

    session.config_mut().set_system_prompt("You are a pirate.");
    session.send("second").await.unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(
        recorded.calls[1].0[0],
        Message::system("You are a helpful assistant.")
    );

    // After a reset the new prompt takes effect.
    drop(recorded);
    session.reset();
    session.send("third").await.unwrap();
    assert_eq!(session.history().messages()[0], Message::system("You are a pirate."));
}

// ========================================================================
// Reset
// ========================================================================

#[tokio::test]
async fn test_reset_keeps_documents_and_issues_new_id() {
    let (mut session, _) = ready_session(vec![Ok("ok")]);
    session.add_document("notes.txt", b"remember this");
    session.send("hello").await.unwrap();
    let old_id = session.id().to_string();

    session.reset();

    assert!(session.history().is_empty());
    assert_ne!(session.id(), old_id);
    assert_eq!(session.documents().get("notes.txt"), Some("remember this"));
    assert!(session.is_ready());
}

// ========================================================================
// Documents
// ========================================================================

#[test]
fn test_add_document_condenses_and_overwrites() {
    let (session, _) = session_with(vec![]);
    let mut session = session.with_ingestor(DocumentIngestor::new(5));
    assert_eq!(session.ingestor().max_context_chars(), 5);

    let doc = session.add_document("a.txt", b"abcdefgh");
    assert!(doc.is_text());
    assert_eq!(session.documents().get("a.txt"), Some("abcde... [text truncated]"));

    session.add_document("a.txt", b"new");
    assert_eq!(session.documents().len(), 1);
    assert_eq!(session.documents().get("a.txt"), Some("new"));

    assert_eq!(session.remove_document("a.txt").as_deref(), Some("new"));
    assert!(session.documents().is_empty());
}

#[test]
fn test_failed_extraction_is_reported_but_stored() {
    let (mut session, _) = session_with(vec![]);
    let doc = session.add_document("scan.pdf", b"garbage");

    assert!(!doc.is_text());
    let stored = session.documents().get("scan.pdf").unwrap();
    assert!(stored.starts_with("Error extracting PDF text: "));
}

// ========================================================================
// Export / import
// ========================================================================

#[tokio::test]
async fn test_export_import_roundtrip() {
    let (mut session, _) = ready_session(vec![Ok("Rust is a language.")]);
    session.config_mut().set_temperature(0.3).unwrap();
    session.send("What is Rust?").await.unwrap();

    let snapshot = session.export();
    assert_eq!(snapshot.id, session.id());
    assert_eq!(snapshot.title, "What is Rust?");

    let json = snapshot.to_json().unwrap();
    let (mut restored, _) = session_with(vec![]);
    restored
        .import(ConversationSnapshot::from_json(&json).unwrap())
        .unwrap();

    assert_eq!(restored.history().messages(), session.history().messages());
    assert_eq!(restored.config(), session.config());
    assert_eq!(restored.id(), session.id());
}

#[tokio::test]
async fn test_export_title_truncates_long_first_message() {
    let (mut session, _) = ready_session(vec![Ok("ok")]);
    let long_input = "abcdefghij".repeat(5);
    session.send(&long_input).await.unwrap();

    let snapshot = session.export();
    assert_eq!(snapshot.title, format!("{}...", &long_input[..40]));
}

#[tokio::test]
async fn test_export_title_comes_from_context_augmented_message() {
    let (mut session, _) = ready_session(vec![Ok("ok")]);
    session.add_document("notes.txt", b"Meeting moved to Friday.");
    session.send("When is the meeting?").await.unwrap();

    let stored = session.history().first_user_message().unwrap().content.clone();
    assert!(stored.starts_with("\nContext information:\nFrom notes.txt:"));

    let snapshot = session.export();
    let expected: String = stored.chars().take(40).collect();
    assert_eq!(snapshot.title, format!("{expected}..."));
    assert!(!snapshot.title.contains("When is the meeting?"));
}

#[test]
fn test_export_without_user_message_uses_timestamp_title() {
    let (session, _) = session_with(vec![]);
    let snapshot = session.export();
    assert_eq!(snapshot.title, format!("Conversation {}", snapshot.timestamp));
    assert!(snapshot.messages.is_empty());
}

#[test]
fn test_import_keeps_documents_and_rejects_invalid_snapshot() {
    let (mut session, _) = session_with(vec![]);
    session.insert_document("kept.txt", "still here");

    let mut config = SessionConfig::default();
    config.temperature = 3.0;
    let bad = ConversationSnapshot::with_timestamp(
        "bad",
        vec![Message::user("x")],
        config,
        "2024-01-01 00:00:00",
    );
    let id_before = session.id().to_string();
    assert!(session.import(bad).is_err());
    assert_eq!(session.id(), id_before);

    let good = ConversationSnapshot::with_timestamp(
        "good",
        vec![Message::system("s"), Message::user("x"), Message::assistant("y")],
        SessionConfig::default(),
        "2024-01-01 00:00:00",
    );
    session.import(good).unwrap();
    assert_eq!(session.id(), "good");
    assert_eq!(session.history().len(), 3);
    assert_eq!(session.documents().get("kept.txt"), Some("still here"));
}

#[tokio::test]
async fn test_library_save_and_load() {
    let (mut session, _) = ready_session(vec![Ok("first reply")]);
    session.send("first chat").await.unwrap();

    let mut library = ConversationLibrary::new();
    let id = session.save_to(&mut library);
    let saved_messages = session.history().messages().to_vec();

    session.reset();
    assert!(session.history().is_empty());

    session.load_from(&library, &id).unwrap();
    assert_eq!(session.id(), id);
    assert_eq!(session.history().messages(), saved_messages.as_slice());

    let err = session.load_from(&library, "missing").unwrap_err();
    assert!(err.is_config());
}
