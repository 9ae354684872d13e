use std::sync::Arc;
use std::time::{Duration, Instant};

use chat_backend::{ChatBackend, Message, Sender};
use chat_session::{
    path_for_conversation, ChatView, MemoryNavigator, Navigator, NoticeLevel, SharedNotices,
    ViewState,
};

use crate::commands::{help_text, parse_slash_command, SlashCommand};

/// How a printed line should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    User,
    Assistant,
    Info,
    Warning,
    Error,
}

/// Output seam between the app and the terminal.
pub trait Console {
    fn print(&mut self, kind: LineKind, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Terminal chat session: owns the active view and renders it incrementally.
pub struct App {
    backend: Arc<dyn ChatBackend>,
    navigator: MemoryNavigator,
    notices: SharedNotices,
    view: Option<ChatView>,
    rendered: usize,
    reply_timeout: Duration,
}

impl App {
    pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(60);
    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(backend: Arc<dyn ChatBackend>, start_path: impl Into<String>) -> Self {
        Self {
            backend,
            navigator: MemoryNavigator::new(start_path),
            notices: SharedNotices::new(),
            view: None,
            rendered: 0,
            reply_timeout: Self::DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn current_path(&self) -> String {
        self.navigator.current_path()
    }

    pub fn view(&self) -> Option<&ChatView> {
        self.view.as_ref()
    }

    /// Mounts a view for the current path, replacing any previous one.
    pub fn mount(&mut self, out: &mut dyn Console) {
        self.view = None;
        self.rendered = 0;

        let view = ChatView::mount(
            Arc::clone(&self.backend),
            &self.navigator,
            Box::new(self.notices.clone()),
        );
        self.flush_notices(out);

        match view.state() {
            ViewState::Ready => {
                if let Some(id) = view.conversation_id() {
                    out.print(LineKind::Info, &format!("Conversation {id}"));
                }
            }
            ViewState::Failed(message) => {
                out.print(LineKind::Error, &format!("Could not load chat: {message}"));
                out.print(
                    LineKind::Info,
                    "Use /new to try again, /open <id> to pick a conversation, or /quit.",
                );
            }
        }

        self.view = Some(view);
        self.render_new_messages(out);
    }

    /// Handles one line of input. Returns whether the loop should continue.
    pub fn handle_line(&mut self, line: &str, out: &mut dyn Console) -> Flow {
        if let Some(command) = parse_slash_command(line) {
            return self.run_command(command, out);
        }

        let Some(view) = self.view.as_mut() else {
            return Flow::Continue;
        };
        if !view.is_ready() {
            out.print(
                LineKind::Warning,
                "This chat failed to load. Use /new or /open <id>.",
            );
            return Flow::Continue;
        }

        if view.submit(line).is_some() {
            self.render_new_messages(out);
            self.await_replies(out);
        }
        Flow::Continue
    }

    /// Applies finished sends and prints anything new.
    pub fn poll(&mut self, out: &mut dyn Console) {
        if let Some(view) = self.view.as_mut() {
            view.drain_events();
        }
        self.flush_notices(out);
        self.render_new_messages(out);
    }

    /// Polls until no send is in flight or the reply timeout elapses.
    pub fn await_replies(&mut self, out: &mut dyn Console) {
        let deadline = Instant::now() + self.reply_timeout;

        loop {
            let in_flight = self.view.as_ref().map_or(0, ChatView::in_flight);
            if in_flight == 0 {
                break;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                out.print(
                    LineKind::Warning,
                    "Still waiting for a reply; it will show up after your next input.",
                );
                break;
            }

            if let Some(view) = self.view.as_ref() {
                view.wait_for_events(remaining.min(Self::POLL_INTERVAL));
            }
            self.poll(out);
        }

        self.poll(out);
    }

    fn run_command(&mut self, command: SlashCommand, out: &mut dyn Console) -> Flow {
        match command {
            SlashCommand::Help => out.print(LineKind::Info, help_text()),
            SlashCommand::List => self.list_conversations(out),
            SlashCommand::New => {
                self.navigator.navigate("/");
                self.mount(out);
            }
            SlashCommand::Open(Some(id)) => {
                self.navigator.navigate(path_for_conversation(&id));
                self.mount(out);
            }
            SlashCommand::Open(None) => out.print(LineKind::Warning, "Usage: /open <id>"),
            SlashCommand::Delete => self.delete_current(out),
            SlashCommand::Quit => return Flow::Exit,
            SlashCommand::Unknown(command) => out.print(
                LineKind::Warning,
                &format!("Unknown command {command}. Type /help for commands."),
            ),
        }
        Flow::Continue
    }

    fn list_conversations(&mut self, out: &mut dyn Console) {
        match self.backend.list_conversations() {
            Ok(summaries) if summaries.is_empty() => {
                out.print(LineKind::Info, "No conversations yet.");
            }
            Ok(summaries) => {
                let current = self.view.as_ref().and_then(ChatView::conversation_id);
                for summary in summaries {
                    let marker = if current == Some(summary.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    out.print(
                        LineKind::Info,
                        &format!("{marker} {}  {}", summary.id, summary.created_at),
                    );
                }
            }
            Err(error) => out.print(
                LineKind::Error,
                &format!("Failed to list conversations: {error}"),
            ),
        }
    }

    fn delete_current(&mut self, out: &mut dyn Console) {
        let Some(id) = self
            .view
            .as_ref()
            .and_then(ChatView::conversation_id)
            .map(str::to_string)
        else {
            out.print(LineKind::Warning, "No conversation to delete.");
            return;
        };

        match self.backend.delete_conversation(&id) {
            Ok(()) => {
                tracing::debug!(conversation_id = %id, "deleted chat");
                out.print(LineKind::Info, &format!("Deleted conversation {id}"));
                self.navigator.navigate("/");
                self.mount(out);
            }
            Err(error) => out.print(
                LineKind::Error,
                &format!("Failed to delete conversation: {error}"),
            ),
        }
    }

    fn flush_notices(&mut self, out: &mut dyn Console) {
        for notice in self.notices.take() {
            let kind = match notice.level {
                NoticeLevel::Warning => LineKind::Warning,
                NoticeLevel::Error => LineKind::Error,
            };
            out.print(kind, &notice.text);
        }
    }

    fn render_new_messages(&mut self, out: &mut dyn Console) {
        let Some(view) = self.view.as_ref() else {
            return;
        };

        let messages = view.transcript().messages();
        for message in messages.iter().skip(self.rendered) {
            render_message(message, out);
        }
        self.rendered = messages.len();
    }
}

fn render_message(message: &Message, out: &mut dyn Console) {
    match message.sender {
        Sender::User => out.print(LineKind::User, &format!("you › {}", message.content)),
        Sender::Assistant => out.print(LineKind::Assistant, &format!("bot › {}", message.content)),
    }
}
