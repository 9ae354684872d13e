use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("{0} must not be empty")]
    EmptyArgument(&'static str),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatApiError {
    /// Returns the HTTP status for non-2xx responses.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns the message meant for people: the server-provided detail for
    /// status failures, the full error text otherwise.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorPayload {
    fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) => non_empty(text),
            Value::Array(items) => {
                let parts = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(text) => non_empty(text),
                        Value::Object(fields) => fields
                            .get("msg")
                            .and_then(Value::as_str)
                            .and_then(non_empty),
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            Value::Object(fields) => fields
                .get("msg")
                .or_else(|| fields.get("message"))
                .and_then(Value::as_str)
                .and_then(non_empty),
            _ => None,
        }
    }
}

/// Extract the user-facing message from a non-2xx response body.
///
/// Prefers `detail` (string or validation-error list), then `message`, then
/// the status reason phrase.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.detail_message() {
            return message;
        }
        if let Some(message) = payload.message.as_deref().and_then(non_empty) {
            return message;
        }
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
