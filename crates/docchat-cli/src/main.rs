use anyhow::Result;
use clap::Parser;
use docchat_cli::app::{self, App};
use docchat_core::{Session, Settings};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "DocChat - chat with an LLM, grounded in your documents")]
#[command(version)]
struct Cli {
    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model to use (see /models)
    #[arg(short, long)]
    model: Option<String>,

    /// API key; defaults to the environment variable named in settings
    #[arg(long)]
    api_key: Option<String>,

    /// Sampling temperature (0.0-1.0)
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Maximum tokens per response (64-4096)
    #[arg(long)]
    max_tokens: Option<u32>,

    /// System prompt for the conversation
    #[arg(long)]
    system_prompt: Option<String>,

    /// Document to use as context (repeatable)
    #[arg(short, long = "doc")]
    docs: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load();
    if let Some(ref model) = cli.model {
        settings.llm.default_model = model.clone();
    }
    if let Some(prompt) = cli.system_prompt.clone() {
        settings.chat.system_prompt = prompt;
    }

    tracing::debug!(
        model = %settings.llm.default_model,
        base_url = %settings.llm.base_url,
        docs = cli.docs.len(),
        "starting docchat"
    );

    let mut session = Session::from_settings(&settings);
    if let Some(temperature) = cli.temperature {
        session.config_mut().set_temperature(temperature)?;
    }
    if let Some(max_tokens) = cli.max_tokens {
        session.config_mut().set_max_tokens(max_tokens)?;
    }

    let mut app = App::new(settings, session, cli.api_key.clone());
    for doc in &cli.docs {
        if let app::Reply::Text(text) = app.handle_line(&format!("/upload {doc}")).await {
            eprintln!("{text}");
        }
    }

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&mut app, &prompt).await?;
    } else {
        app::run_repl(&mut app).await?;
    }

    Ok(())
}
