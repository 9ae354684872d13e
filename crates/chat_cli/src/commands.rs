#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    List,
    New,
    Open(Option<String>),
    Delete,
    Quit,
    Unknown(String),
}

/// Commands offered for completion, in help order.
pub const SLASH_COMMANDS: &[&str] = &["/help", "/list", "/new", "/open", "/delete", "/quit"];

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or(trimmed).to_string();
    let argument = parts.next().map(str::to_string);

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/list" => SlashCommand::List,
        "/new" => SlashCommand::New,
        "/open" => SlashCommand::Open(argument),
        "/delete" => SlashCommand::Delete,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}

pub fn help_text() -> &'static str {
    "Commands:\n  \
     /help         show this help\n  \
     /list         list conversations\n  \
     /new          start a new conversation\n  \
     /open <id>    open an existing conversation\n  \
     /delete       delete the current conversation and start a new one\n  \
     /quit         exit\n\
     Anything else is sent as a message."
}
