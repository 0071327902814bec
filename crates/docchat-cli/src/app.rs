use crate::commands::{handle_command, CommandResult};
use anyhow::Result;
use docchat_core::{ChatError, ConversationLibrary, ConversationSnapshot, Session, Settings};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// What the shell should do after a line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Host shell state: the live session plus conversations saved this run.
pub struct App {
    session: Session,
    library: ConversationLibrary,
    settings: Settings,
    api_key: Option<String>,
}

impl App {
    pub fn new(settings: Settings, session: Session, api_key: Option<String>) -> Self {
        Self {
            session,
            library: ConversationLibrary::new(),
            settings,
            api_key,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn library(&self) -> &ConversationLibrary {
        &self.library
    }

    /// Initialize the model named in the session config.
    pub fn initialize(&mut self) -> std::result::Result<(), ChatError> {
        let model = self.session.config().model.clone();
        self.session.initialize(&model, self.api_key.as_deref())
    }

    pub async fn handle_line(&mut self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Text(String::new());
        }
        match handle_command(line) {
            CommandResult::Quit => Reply::Quit,
            CommandResult::NotACommand => Reply::Text(self.chat(line).await),
            command => Reply::Text(self.apply(command)),
        }
    }

    async fn chat(&mut self, input: &str) -> String {
        match self.session.send(input).await {
            Ok(completion) => completion.into_text(),
            Err(ChatError::NotInitialized) => {
                "Model not initialized. Use /model <name> to select one (see /models).".into()
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    fn apply(&mut self, command: CommandResult) -> String {
        match command {
            CommandResult::Message(msg) => msg,
            CommandResult::NewConversation => {
                self.session.reset();
                format!("Started new conversation {}", self.session.id())
            }
            CommandResult::Upload(path) => self.upload(Path::new(&path)),
            CommandResult::ListDocuments => {
                let names = self.session.documents().names();
                if names.is_empty() {
                    "No active documents. Use /upload <path> to add one.".into()
                } else {
                    format!("Active documents:\n  {}", names.join("\n  "))
                }
            }
            CommandResult::RemoveDocument(name) => match self.session.remove_document(&name) {
                Some(_) => format!("Removed '{name}'"),
                None => format!("No active document named '{name}'"),
            },
            CommandResult::PreviewDocument(name) => self
                .session
                .documents()
                .preview(&name, self.settings.documents.preview_chars)
                .unwrap_or_else(|| format!("No active document named '{name}'")),
            CommandResult::Export(path) => self.export(path),
            CommandResult::Import(path) => self.import(Path::new(&path)),
            CommandResult::SaveConversation => {
                if self.session.history().is_empty() {
                    "No messages to save.".into()
                } else {
                    let id = self.session.save_to(&mut self.library);
                    format!("Saved conversation {id}")
                }
            }
            CommandResult::LoadConversation(id) => {
                match self.session.load_from(&self.library, &id) {
                    Ok(()) => format!(
                        "Loaded conversation {id} ({} messages)",
                        self.session.history().len()
                    ),
                    Err(e) => format!("Error: {e}"),
                }
            }
            CommandResult::ListConversations => {
                let saved = self.library.list();
                if saved.is_empty() {
                    "No saved conversations yet. Use /save to keep this one.".into()
                } else {
                    saved
                        .iter()
                        .map(|s| {
                            format!(
                                "{}  {}\n    {} | Model: {}",
                                s.id, s.title, s.timestamp, s.config.model
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            CommandResult::ModelChanged(name) => {
                match self.session.initialize(&name, self.api_key.as_deref()) {
                    Ok(()) => format!("Model {name} initialized successfully!"),
                    Err(e) => format!("Failed to initialize {name}: {e}"),
                }
            }
            CommandResult::ListModels => {
                let current = self.session.adapter().model().map(|m| m.name.clone());
                self.session
                    .adapter()
                    .catalog()
                    .models()
                    .iter()
                    .map(|m| {
                        let marker = if current.as_deref() == Some(m.name.as_str()) { "*" } else { " " };
                        format!("{marker} {} ({}, {} ctx)", m.name, m.id, m.context_window)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            CommandResult::SetTemperature(value) => {
                match self.session.config_mut().set_temperature(value) {
                    Ok(()) => format!("Temperature set to {value}"),
                    Err(e) => format!("Error: {e}"),
                }
            }
            CommandResult::SetMaxTokens(value) => {
                match self.session.config_mut().set_max_tokens(value) {
                    Ok(()) => format!("Max tokens set to {value}"),
                    Err(e) => format!("Error: {e}"),
                }
            }
            CommandResult::SetSystemPrompt(prompt) => {
                self.session.config_mut().set_system_prompt(prompt);
                if self.session.history().has_system() {
                    "System prompt updated. It applies from the next /new conversation.".into()
                } else {
                    "System prompt updated.".into()
                }
            }
            CommandResult::ShowStatus => self.status(),
            CommandResult::Quit | CommandResult::NotACommand => String::new(),
        }
    }

    fn upload(&mut self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let blob = match std::fs::read(path) {
            Ok(blob) => blob,
            Err(e) => return format!("Error processing file: {e}"),
        };

        let doc = self.session.add_document(&name, &blob);
        if doc.is_text() {
            format!("File '{name}' processed successfully!")
        } else {
            format!("File '{name}' added, but no text was extracted: {}", doc.excerpt)
        }
    }

    fn export(&self, path: Option<String>) -> String {
        let snapshot = self.session.export();
        let path = path.unwrap_or_else(|| snapshot.file_name());
        let result = snapshot
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));
        match result {
            Ok(()) => format!("Conversation '{}' written to {path}", snapshot.title),
            Err(e) => format!("Error exporting conversation: {e}"),
        }
    }

    fn import(&mut self, path: &Path) -> String {
        let result = std::fs::read_to_string(path)
            .map_err(ChatError::from)
            .and_then(|json| ConversationSnapshot::from_json(&json))
            .and_then(|snapshot| self.session.import(snapshot));
        match result {
            Ok(()) => format!(
                "Imported conversation {} ({} messages)",
                self.session.id(),
                self.session.history().len()
            ),
            Err(e) => format!("Error importing conversation: {e}"),
        }
    }

    fn status(&self) -> String {
        let config = self.session.config();
        let state = if self.session.is_ready() { "ready" } else { "not initialized" };
        let usage = self.session.adapter().usage();
        format!(
            "Model: {} ({state}) | Temperature: {} | Max tokens: {}\n\
             Conversation: {} | Messages: {} (~{} tokens) | Documents: {}\n\
             Requests: {} | Tokens in/out: {}/{}",
            config.model,
            config.temperature,
            config.max_tokens,
            self.session.id(),
            self.session.history().len(),
            self.session.history().estimate_tokens(),
            self.session.documents().len(),
            usage.request_count,
            usage.total_input_tokens,
            usage.total_output_tokens,
        )
    }
}

/// Answer one prompt and exit.
pub async fn run_single_prompt(app: &mut App, prompt: &str) -> Result<()> {
    app.initialize()?;
    if let Reply::Text(text) = app.handle_line(prompt).await {
        println!("{text}");
    }
    Ok(())
}

// ── Interactive shell ───────────────────────────────────────────────────

pub async fn run_repl(app: &mut App) -> Result<()> {
    match app.initialize() {
        Ok(()) => println!("Model {} ready. Type /help for commands.", app.session().config().model),
        Err(e) => {
            eprintln!("Model not initialized: {e}");
            eprintln!("Use /model <name> once a key is available. Type /help for commands.");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match app.handle_line(&line).await {
            Reply::Quit => break,
            Reply::Text(text) if text.is_empty() => {}
            Reply::Text(text) => println!("{text}\n"),
        }
    }
    Ok(())
}
