//! HTTP-backed implementation of the shared `chat_backend` contract.
//!
//! This adapter drives the async `chat_api` client to completion for each
//! call and translates wire payloads and transport errors into the
//! backend-neutral model expected by chat views.

use std::sync::Arc;
use std::time::Duration;

use chat_api::{
    ChatApiClient, ChatApiConfig, ChatApiError, ChatResponse, MessageResponse, StartChat,
    WireSender,
};
use chat_backend::{
    BackendError, BackendErrorKind, BackendProfile, ChatBackend, Conversation,
    ConversationSummary, Message, Sender,
};

/// Stable backend identifier used for startup selection.
pub const HTTP_BACKEND_ID: &str = "http";

/// Runtime configuration for the HTTP backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpBackendConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub no_proxy: bool,
}

impl HttpBackendConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn without_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    fn into_chat_api_config(self) -> ChatApiConfig {
        let mut config = ChatApiConfig::new(self.base_url);

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }

        if self.no_proxy {
            config = config.without_proxy();
        }

        config
    }
}

trait Transport: Send + Sync {
    fn endpoint(&self) -> String;
    fn list_chats(&self) -> Result<Vec<StartChat>, ChatApiError>;
    fn start_chat(&self) -> Result<StartChat, ChatApiError>;
    fn get_chat(&self, chat_id: &str) -> Result<ChatResponse, ChatApiError>;
    fn send_message(&self, chat_id: &str, content: &str) -> Result<MessageResponse, ChatApiError>;
    fn delete_chat(&self, chat_id: &str) -> Result<(), ChatApiError>;
}

#[derive(Debug)]
struct BlockingTransport {
    client: ChatApiClient,
}

impl BlockingTransport {
    fn block_on<F, T>(&self, future: F) -> Result<T, ChatApiError>
    where
        F: std::future::Future<Output = Result<T, ChatApiError>>,
    {
        // `Runtime` cannot be shared across the worker threads that call
        // into this backend concurrently, so each call gets its own.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(future)
    }
}

impl Transport for BlockingTransport {
    fn endpoint(&self) -> String {
        self.client.api_base().to_string()
    }

    fn list_chats(&self) -> Result<Vec<StartChat>, ChatApiError> {
        self.block_on(self.client.list_chats())
    }

    fn start_chat(&self) -> Result<StartChat, ChatApiError> {
        self.block_on(self.client.start_chat())
    }

    fn get_chat(&self, chat_id: &str) -> Result<ChatResponse, ChatApiError> {
        self.block_on(self.client.get_chat(chat_id))
    }

    fn send_message(&self, chat_id: &str, content: &str) -> Result<MessageResponse, ChatApiError> {
        self.block_on(self.client.send_message(chat_id, content))
    }

    fn delete_chat(&self, chat_id: &str) -> Result<(), ChatApiError> {
        self.block_on(self.client.delete_chat(chat_id))
    }
}

/// `ChatBackend` adapter backed by `chat_api` transport primitives.
pub struct HttpChatBackend {
    transport: Arc<dyn Transport>,
}

impl HttpChatBackend {
    /// Creates a backend using real HTTP transport.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let client = ChatApiClient::new(config.into_chat_api_config()).map_err(map_init_error)?;
        Ok(Self {
            transport: Arc::new(BlockingTransport { client }),
        })
    }

    #[cfg(test)]
    fn with_transport_for_tests(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl ChatBackend for HttpChatBackend {
    fn profile(&self) -> BackendProfile {
        BackendProfile {
            backend_id: HTTP_BACKEND_ID.to_string(),
            endpoint: Some(self.transport.endpoint()),
        }
    }

    fn list_conversations(&self) -> Result<Vec<ConversationSummary>, BackendError> {
        let chats = self.transport.list_chats().map_err(map_transport_error)?;
        Ok(chats.into_iter().map(summary_from_wire).collect())
    }

    fn create_conversation(&self) -> Result<ConversationSummary, BackendError> {
        self.transport
            .start_chat()
            .map(summary_from_wire)
            .map_err(map_transport_error)
    }

    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation, BackendError> {
        let chat = self
            .transport
            .get_chat(conversation_id)
            .map_err(map_transport_error)?;
        Ok(Conversation {
            id: chat.chat_id,
            created_at: chat.created_at,
            messages: chat.messages.into_iter().map(message_from_wire).collect(),
        })
    }

    fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message, BackendError> {
        self.transport
            .send_message(conversation_id, content)
            .map(message_from_wire)
            .map_err(map_transport_error)
    }

    fn delete_conversation(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.transport
            .delete_chat(conversation_id)
            .map_err(map_transport_error)
    }
}

fn summary_from_wire(chat: StartChat) -> ConversationSummary {
    ConversationSummary {
        id: chat.chat_id,
        created_at: chat.created_at,
        message: chat.message.filter(|text| !text.trim().is_empty()),
    }
}

fn message_from_wire(message: MessageResponse) -> Message {
    Message {
        id: message.message_id,
        sender: match message.sender {
            WireSender::User => Sender::User,
            WireSender::Assistant => Sender::Assistant,
        },
        content: message.content,
        created_at: message.created_at,
    }
}

fn map_transport_error(error: ChatApiError) -> BackendError {
    let kind = if error.is_not_found() {
        BackendErrorKind::NotFound
    } else {
        BackendErrorKind::Other
    };
    tracing::debug!(?kind, %error, "chat api call failed");
    BackendError::new(kind, error.display_message())
}

fn map_init_error(error: ChatApiError) -> BackendError {
    BackendError::other(format!("Failed to initialize http backend: {error}"))
}
