//! Chat-session client core.
//!
//! Acquires or resumes a conversation for a view, renders its transcript, and
//! keeps it consistent while messages are sent and replies arrive
//! asynchronously.
//!
//! # Public API Overview
//! - Mount a [`ChatView`] with a [`chat_backend::ChatBackend`], a [`Navigator`] and a
//!   [`NoticeSink`]. Mounting runs [`SessionResolver`] exactly once.
//! - Call [`ChatView::submit`] for user input and [`ChatView::drain_events`] on every
//!   loop turn to apply replies.
//! - Session identity lives only in the navigator's path (`/<conversation id>`).

pub mod config;
pub mod logging;

pub mod dispatch;
pub mod location;
pub mod notice;
pub mod resolver;
pub mod transcript;
pub mod view;

pub use crate::dispatch::{DispatchEvent, Dispatcher, SubmissionId};
pub use crate::location::{
    conversation_id_from_path, path_for_conversation, MemoryNavigator, Navigator,
};
pub use crate::notice::{Notice, NoticeLevel, NoticeSink, SharedNotices};
pub use crate::resolver::{
    ResolveError, ResolvedSession, ResolverState, SessionOrigin, SessionResolver,
};
pub use crate::transcript::Transcript;
pub use crate::view::{ChatView, ViewState};
