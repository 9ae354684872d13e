use serde::{Deserialize, Serialize};

/// Wire representation of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireSender {
    User,
    Assistant,
}

/// Conversation header returned by `GET /chats` and `POST /chats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartChat {
    pub chat_id: String,
    pub created_at: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Full conversation returned by `GET /chats/{chat_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat_id: String,
    pub created_at: String,
    #[serde(default)]
    pub messages: Vec<MessageResponse>,
}

/// One message as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message_id: String,
    pub sender: WireSender,
    pub content: String,
    pub created_at: String,
}

/// Body of `POST /chats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartChatRequest {}

/// Body of `POST /chats/{chat_id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
}

impl SendMessageRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
