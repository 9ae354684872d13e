//! Transport-only client for the chat REST API.
//!
//! This crate owns request building, response parsing, and error
//! normalization for the `/api/chats` endpoints only. It contains no session
//! state and no presentation coupling.
//!
//! Failures of every cause (network, non-2xx status, malformed body) surface
//! as [`ChatApiError`], which keeps the HTTP status around so callers can tell
//! a missing conversation apart from everything else.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use payload::{ChatResponse, MessageResponse, SendMessageRequest, StartChat, WireSender};
pub use reqwest::StatusCode;
pub use url::{endpoint_url, normalize_api_base};
