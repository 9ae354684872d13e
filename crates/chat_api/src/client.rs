use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::headers::build_headers;
use crate::payload::{ChatResponse, MessageResponse, SendMessageRequest, StartChat, StartChatRequest};
use crate::url::{endpoint_url, normalize_api_base};

const CHATS_SEGMENT: &str = "chats";
const MESSAGES_SEGMENT: &str = "messages";

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
    api_base: String,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let api_base = normalize_api_base(&config.base_url);
        endpoint_url(&api_base, &[])?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.no_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(ChatApiError::from)?;

        Ok(Self {
            http,
            config,
            api_base,
        })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    /// Normalized API base, e.g. `http://127.0.0.1:8000/api`.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn build_headers(&self) -> Result<HeaderMap, ChatApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config) {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ChatApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, ChatApiError> {
        let url = endpoint_url(&self.api_base, segments)?;
        let headers = self.build_headers()?;
        Ok(self.http.request(method, url).headers(headers))
    }

    /// `GET /chats`
    pub async fn list_chats(&self) -> Result<Vec<StartChat>, ChatApiError> {
        let request = self.build_request(Method::GET, &[CHATS_SEGMENT])?;
        self.execute_json(request).await
    }

    /// `POST /chats`
    pub async fn start_chat(&self) -> Result<StartChat, ChatApiError> {
        let request = self
            .build_request(Method::POST, &[CHATS_SEGMENT])?
            .json(&StartChatRequest::default());
        self.execute_json(request).await
    }

    /// `GET /chats/{chat_id}`
    pub async fn get_chat(&self, chat_id: &str) -> Result<ChatResponse, ChatApiError> {
        let chat_id = require_non_empty(chat_id, "chat id")?;
        let request = self.build_request(Method::GET, &[CHATS_SEGMENT, chat_id])?;
        self.execute_json(request).await
    }

    /// `POST /chats/{chat_id}/messages`
    pub async fn send_message(
        &self,
        chat_id: &str,
        content: &str,
    ) -> Result<MessageResponse, ChatApiError> {
        let chat_id = require_non_empty(chat_id, "chat id")?;
        require_non_empty(content, "message content")?;
        let request = self
            .build_request(Method::POST, &[CHATS_SEGMENT, chat_id, MESSAGES_SEGMENT])?
            .json(&SendMessageRequest::new(content));
        self.execute_json(request).await
    }

    /// `DELETE /chats/{chat_id}`; the response body is ignored.
    pub async fn delete_chat(&self, chat_id: &str) -> Result<(), ChatApiError> {
        let chat_id = require_non_empty(chat_id, "chat id")?;
        let request = self.build_request(Method::DELETE, &[CHATS_SEGMENT, chat_id])?;
        self.execute(request).await.map(|_| ())
    }

    async fn execute_json<T>(&self, request: RequestBuilder) -> Result<T, ChatApiError>
    where
        T: DeserializeOwned,
    {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(ChatApiError::from)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, ChatApiError> {
        let request = request.build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "chat api request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = parse_error_message(status, &body);
        tracing::debug!(status = status.as_u16(), %message, "chat api request failed");
        Err(ChatApiError::Status { status, message })
    }
}

fn require_non_empty<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ChatApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ChatApiError::EmptyArgument(name))
    } else {
        Ok(trimmed)
    }
}
