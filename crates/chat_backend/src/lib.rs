//! Minimal backend-agnostic contract for a chat conversation service.
//!
//! This crate defines only the conversation/message model and the blocking
//! operations a chat view needs. It excludes transport details, wire payloads,
//! and any presentation concerns.

use std::fmt;

/// Opaque server-assigned conversation identifier.
pub type ConversationId = String;

/// Author of a message. The client recognizes exactly two senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Returns the wire/display name of the sender.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub created_at: String,
}

impl Message {
    /// Constructs a user-authored message.
    #[must_use]
    pub fn user(
        id: impl Into<String>,
        content: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: Sender::User,
            content: content.into(),
            created_at: created_at.into(),
        }
    }

    /// Constructs an assistant-authored message.
    #[must_use]
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: Sender::Assistant,
            content: content.into(),
            created_at: created_at.into(),
        }
    }
}

/// Conversation with its full message sequence, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub created_at: String,
    pub messages: Vec<Message>,
}

/// Conversation header as returned by list and create operations.
///
/// `message` carries the optional first assistant message a backend may
/// return inline when a conversation is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub created_at: String,
    pub message: Option<String>,
}

/// Coarse failure classification preserved across the transport seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// The named conversation does not exist.
    NotFound,
    /// Network failure, non-2xx status, malformed body, or anything else.
    Other,
}

/// Normalized backend failure carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    kind: BackendErrorKind,
    message: String,
}

impl BackendError {
    #[must_use]
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Other, message)
    }

    #[must_use]
    pub fn kind(&self) -> BackendErrorKind {
        self.kind
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == BackendErrorKind::NotFound
    }

    /// Returns the display message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendError {}

impl From<String> for BackendError {
    fn from(message: String) -> Self {
        Self::other(message)
    }
}

impl From<&str> for BackendError {
    fn from(message: &str) -> Self {
        Self::other(message)
    }
}

/// Immutable metadata describing a backend instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendProfile {
    pub backend_id: String,
    pub endpoint: Option<String>,
}

/// Blocking conversation service used by chat views.
///
/// Calls may take arbitrarily long; callers run them off their event loop
/// when latency matters. Implementations must not assume any ordering
/// between concurrent calls for the same conversation.
pub trait ChatBackend: Send + Sync + 'static {
    /// Returns backend identity metadata.
    fn profile(&self) -> BackendProfile;

    /// Lists known conversations.
    fn list_conversations(&self) -> Result<Vec<ConversationSummary>, BackendError>;

    /// Creates a conversation, possibly with an inline first assistant message.
    fn create_conversation(&self) -> Result<ConversationSummary, BackendError>;

    /// Fetches a conversation with its full message sequence.
    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation, BackendError>;

    /// Sends user text and returns the resulting assistant message.
    fn send_message(&self, conversation_id: &str, content: &str)
        -> Result<Message, BackendError>;

    /// Deletes a conversation and its messages.
    ///
    /// Backends may return an error when deletion is unsupported.
    fn delete_conversation(&self, conversation_id: &str) -> Result<(), BackendError> {
        let _ = conversation_id;
        Err(BackendError::other(
            "Deleting conversations is not supported by this backend",
        ))
    }
}
