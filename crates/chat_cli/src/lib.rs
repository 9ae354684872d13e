//! Terminal chat client.
//!
//! ## Backend bootstrap
//!
//! Select the backend with `--backend` or `CHAT_BACKEND`:
//!
//! - `http` (default) talks to the chat REST API at `CHAT_API_BASE_URL`
//!   (`/api` is appended; blank means `http://127.0.0.1:8000`).
//! - `mock` is an in-memory backend with canned replies for local runs.
//!
//! `CHAT_API_TIMEOUT_SEC` sets an optional per-request timeout and
//! `CHAT_LOG` a `tracing` filter directive for stderr diagnostics.

pub mod app;
pub mod backends;
pub mod commands;
pub mod placeholder;
pub mod terminal;
