use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chat_cli::app::{App, Console, Flow, LineKind};
use chat_cli::backends::{backend_for_id, BackendSettings};
use chat_cli::placeholder::{random_placeholder, FOOTER};
use chat_cli::terminal::{CommandHelper, StdoutConsole};
use chat_session::config::{parse_timeout_secs, BackendKind, EnvConfig};
use chat_session::logging::init_logging;
use chat_session::path_for_conversation;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

#[derive(Parser, Debug)]
#[command(name = "chat")]
#[command(about = "Terminal client for the chat API", long_about = None)]
struct Cli {
    /// API origin, e.g. http://127.0.0.1:8000 (overrides CHAT_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Backend to use: http or mock (overrides CHAT_BACKEND)
    #[arg(long)]
    backend: Option<String>,

    /// Request timeout in seconds (overrides CHAT_API_TIMEOUT_SEC)
    #[arg(long)]
    timeout: Option<String>,

    /// Log filter directive (overrides CHAT_LOG)
    #[arg(long)]
    log: Option<String>,

    /// Conversation to open at startup; a new one is created when omitted
    conversation: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = EnvConfig::from_env().map_err(|error| anyhow!(error))?;

    init_logging(cli.log.as_deref().or(env.log_filter.as_deref()));

    let backend_kind = match cli.backend.as_deref() {
        Some(value) => BackendKind::parse(value).map_err(|error| anyhow!(error))?,
        None => env.backend,
    };
    let timeout: Option<Duration> = match cli.timeout.as_deref() {
        Some(value) => Some(parse_timeout_secs(value).map_err(|error| anyhow!(error))?),
        None => env.api_timeout,
    };
    let settings = BackendSettings {
        base_url: cli.base_url.or(env.api_base_url),
        timeout,
    };

    let backend = backend_for_id(backend_kind.as_str(), &settings)
        .map_err(|error| anyhow!(error))
        .context("failed to start chat backend")?;
    let profile = backend.profile();
    tracing::debug!(backend = %profile.backend_id, endpoint = ?profile.endpoint, "backend ready");

    let start_path = cli
        .conversation
        .as_deref()
        .map(path_for_conversation)
        .unwrap_or_else(|| "/".to_string());

    let mut console = StdoutConsole;
    let mut app = App::new(backend, start_path);

    console.print(
        LineKind::Info,
        &format!(
            "Connected to {} backend{}. Type /help for commands.",
            profile.backend_id,
            profile
                .endpoint
                .as_deref()
                .map(|endpoint| format!(" at {endpoint}"))
                .unwrap_or_default()
        ),
    );
    app.mount(&mut console);
    console.print(LineKind::Info, random_placeholder());
    console.print(LineKind::Info, FOOTER);

    let mut editor: Editor<CommandHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(CommandHelper));

    loop {
        match editor.readline("› ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    app.poll(&mut console);
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());

                if app.handle_line(&line, &mut console) == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                console.print(LineKind::Warning, "CTRL-C detected. Type /quit to exit.");
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        }
    }

    Ok(())
}
