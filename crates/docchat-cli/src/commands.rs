/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Start a fresh conversation (documents stay attached).
    NewConversation,
    /// Upload a document from a path.
    Upload(String),
    /// List active documents.
    ListDocuments,
    /// Remove an active document by name.
    RemoveDocument(String),
    /// Show the first characters of an active document.
    PreviewDocument(String),
    /// Write the conversation as JSON, optionally to an explicit path.
    Export(Option<String>),
    /// Replace the conversation with one read from a JSON file.
    Import(String),
    /// Save current conversation in this run's history.
    SaveConversation,
    /// Load a saved conversation by ID.
    LoadConversation(String),
    /// List saved conversations.
    ListConversations,
    /// Switch to (and initialize) a model.
    ModelChanged(String),
    /// List supported models.
    ListModels,
    /// Set sampling temperature.
    SetTemperature(f32),
    /// Set the response token budget.
    SetMaxTokens(u32),
    /// Replace the system prompt used by new conversations.
    SetSystemPrompt(String),
    /// Show status (model, settings, history size).
    ShowStatus,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/new" | "/clear" => CommandResult::NewConversation,

        // Document commands
        "/upload" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /upload <path to .txt, .pdf or .docx>".into())
            } else {
                CommandResult::Upload(arg.to_string())
            }
        }
        "/docs" => CommandResult::ListDocuments,
        "/remove" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /remove <document-name>".into())
            } else {
                CommandResult::RemoveDocument(arg.to_string())
            }
        }
        "/preview" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /preview <document-name>".into())
            } else {
                CommandResult::PreviewDocument(arg.to_string())
            }
        }

        // Conversation commands
        "/export" => CommandResult::Export((!arg.is_empty()).then(|| arg.to_string())),
        "/import" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /import <conversation.json>".into())
            } else {
                CommandResult::Import(arg.to_string())
            }
        }
        "/save" => CommandResult::SaveConversation,
        "/load" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /load <conversation-id>".into())
            } else {
                CommandResult::LoadConversation(arg.to_string())
            }
        }
        "/history" | "/conversations" => CommandResult::ListConversations,

        // Model & settings commands
        "/model" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /model <model-name> (see /models)".into())
            } else {
                CommandResult::ModelChanged(arg.to_string())
            }
        }
        "/models" => CommandResult::ListModels,
        "/temperature" | "/temp" => match arg.parse::<f32>() {
            Ok(value) => CommandResult::SetTemperature(value),
            Err(_) => CommandResult::Message("Usage: /temperature <0.0-1.0>".into()),
        },
        "/max-tokens" => match arg.parse::<u32>() {
            Ok(value) => CommandResult::SetMaxTokens(value),
            Err(_) => CommandResult::Message("Usage: /max-tokens <64-4096>".into()),
        },
        "/system" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /system <instructions>".into())
            } else {
                CommandResult::SetSystemPrompt(arg.to_string())
            }
        }
        "/status" => CommandResult::ShowStatus,
        "/version" => CommandResult::Message(format!("DocChat v{}", env!("CARGO_PKG_VERSION"))),

        // Unknown command
        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ DocChat Commands ─────────────────────────────────────────────╮

  CONVERSATION
    /new, /clear              Start a new chat (documents are kept)
    /save                     Save the conversation for this run
    /load <id>                Load a saved conversation
    /history                  List saved conversations
    /export [path]            Write the conversation as JSON
    /import <path>            Load a conversation from JSON

  DOCUMENTS
    /upload <path>            Add a .txt, .pdf or .docx as context
    /docs                     List active documents
    /preview <name>           Show the start of a document
    /remove <name>            Stop using a document

  MODEL & SETTINGS
    /model <name>             Select and initialize a model
    /models                   List supported models
    /temperature <v>          Sampling temperature (0.0-1.0)
    /max-tokens <n>           Response budget (64-4096)
    /system <text>            System prompt for new conversations
    /status                   Show model, settings and history size

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit the application

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
