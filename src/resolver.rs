//! Decides whether a view resumes an existing conversation or starts a new one.
//!
//! Resolution runs exactly once per resolver and makes at most two backend
//! calls: a lookup of the requested conversation and, when that is absent or
//! fails, a single create. A lookup failure of any kind (missing conversation
//! or transport trouble) falls back to creation, with a warning notice.

use chat_backend::{BackendError, ChatBackend, ConversationId, ConversationSummary, Message};
use thiserror::Error;

use crate::location::{conversation_id_from_path, Navigator};
use crate::notice::{Notice, NoticeSink};

/// Warning shown when a requested conversation cannot be loaded.
pub const LOOKUP_FAILED_NOTICE: &str = "Chat not found. Starting a new chat.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Uninitialized,
    Resolving,
    /// Lookup failed; a single create is about to follow.
    Redirecting,
    Ready,
    Failed,
}

/// How the resolved conversation was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// The location named an existing conversation.
    Resumed,
    /// The location named nothing; a conversation was created.
    Created,
    /// The named conversation could not be loaded; a new one replaced it.
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub conversation_id: ConversationId,
    pub origin: SessionOrigin,
    /// Initial transcript, oldest first.
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Failed to start a new chat: {0}")]
    Create(BackendError),

    #[error("Failed to load chat {conversation_id} ({lookup}) and failed to start a new chat ({create})")]
    Recovery {
        conversation_id: ConversationId,
        lookup: BackendError,
        create: BackendError,
    },

    #[error("session resolution already ran")]
    AlreadyRun,
}

/// One-shot session resolution state machine.
#[derive(Debug)]
pub struct SessionResolver {
    state: ResolverState,
    transitions: Vec<ResolverState>,
}

impl Default for SessionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionResolver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ResolverState::Uninitialized,
            transitions: vec![ResolverState::Uninitialized],
        }
    }

    #[must_use]
    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Every state entered so far, starting with `Uninitialized`.
    #[must_use]
    pub fn transitions(&self) -> &[ResolverState] {
        &self.transitions
    }

    /// Resolves the session for the current location.
    ///
    /// A second call returns [`ResolveError::AlreadyRun`] without touching the
    /// backend or the navigator.
    pub fn resolve(
        &mut self,
        backend: &dyn ChatBackend,
        navigator: &dyn Navigator,
        notices: &mut dyn NoticeSink,
    ) -> Result<ResolvedSession, ResolveError> {
        if self.state != ResolverState::Uninitialized {
            return Err(ResolveError::AlreadyRun);
        }
        self.enter(ResolverState::Resolving);

        let Some(conversation_id) = conversation_id_from_path(&navigator.current_path()) else {
            return match create_session(backend, navigator, SessionOrigin::Created) {
                Ok(session) => Ok(self.ready(session)),
                Err(error) => Err(self.fail(ResolveError::Create(error))),
            };
        };

        let lookup = match backend.get_conversation(&conversation_id) {
            Ok(conversation) => {
                return Ok(self.ready(ResolvedSession {
                    conversation_id: conversation.id,
                    origin: SessionOrigin::Resumed,
                    messages: conversation.messages,
                }));
            }
            Err(error) => error,
        };

        tracing::warn!(
            %conversation_id,
            kind = ?lookup.kind(),
            error = %lookup,
            "chat lookup failed; starting a new chat"
        );
        notices.notify(Notice::warning(LOOKUP_FAILED_NOTICE));
        self.enter(ResolverState::Redirecting);
        self.enter(ResolverState::Resolving);

        match create_session(backend, navigator, SessionOrigin::Recovered) {
            Ok(session) => Ok(self.ready(session)),
            Err(create) => Err(self.fail(ResolveError::Recovery {
                conversation_id,
                lookup,
                create,
            })),
        }
    }

    fn enter(&mut self, state: ResolverState) {
        tracing::debug!(from = ?self.state, to = ?state, "session resolver transition");
        self.state = state;
        self.transitions.push(state);
    }

    fn ready(&mut self, session: ResolvedSession) -> ResolvedSession {
        self.enter(ResolverState::Ready);
        session
    }

    fn fail(&mut self, error: ResolveError) -> ResolveError {
        tracing::warn!(%error, "session resolution failed");
        self.enter(ResolverState::Failed);
        error
    }
}

fn create_session(
    backend: &dyn ChatBackend,
    navigator: &dyn Navigator,
    origin: SessionOrigin,
) -> Result<ResolvedSession, BackendError> {
    let created = backend.create_conversation()?;
    navigator.relocate(&created.id);
    tracing::debug!(conversation_id = %created.id, ?origin, "created chat");

    let messages = greeting_message(&created).into_iter().collect();
    Ok(ResolvedSession {
        conversation_id: created.id,
        origin,
        messages,
    })
}

/// Turns the inline first message of a freshly created conversation into a
/// transcript entry.
fn greeting_message(created: &ConversationSummary) -> Option<Message> {
    let text = created.message.as_deref()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(Message::assistant(
        format!("local-{}", uuid::Uuid::new_v4()),
        text,
        created.created_at.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use chat_backend_mock::{MockBackend, MockCall, MockOperation};

    use super::*;
    use crate::location::MemoryNavigator;

    #[test]
    fn second_resolve_is_rejected_without_backend_calls() {
        let backend = MockBackend::default();
        let navigator = MemoryNavigator::root();
        let mut notices: Vec<Notice> = Vec::new();
        let mut resolver = SessionResolver::new();

        resolver
            .resolve(&backend, &navigator, &mut notices)
            .expect("first resolve should succeed");
        let error = resolver
            .resolve(&backend, &navigator, &mut notices)
            .expect_err("second resolve should be rejected");

        assert_eq!(error, ResolveError::AlreadyRun);
        assert_eq!(backend.calls(), vec![MockCall::Create]);
        assert_eq!(resolver.state(), ResolverState::Ready);
    }

    #[test]
    fn fresh_create_records_state_path() {
        let backend = MockBackend::default();
        let navigator = MemoryNavigator::root();
        let mut resolver = SessionResolver::new();

        let session = resolver
            .resolve(&backend, &navigator, &mut Vec::<Notice>::new())
            .expect("create should succeed");

        assert_eq!(session.origin, SessionOrigin::Created);
        assert_eq!(
            resolver.transitions(),
            &[
                ResolverState::Uninitialized,
                ResolverState::Resolving,
                ResolverState::Ready,
            ]
        );
    }

    #[test]
    fn create_failure_on_root_fails_without_relocation() {
        let backend = MockBackend::default();
        backend.fail_next(MockOperation::Create, 1);
        let navigator = MemoryNavigator::root();
        let mut notices: Vec<Notice> = Vec::new();
        let mut resolver = SessionResolver::new();

        let error = resolver
            .resolve(&backend, &navigator, &mut notices)
            .expect_err("create failure should fail resolution");

        assert!(matches!(error, ResolveError::Create(_)));
        assert_eq!(resolver.state(), ResolverState::Failed);
        assert!(navigator.relocations().is_empty());
        assert!(notices.is_empty());
    }

    #[test]
    fn greeting_is_attributed_to_assistant() {
        let summary = ConversationSummary {
            id: "new1".to_string(),
            created_at: "t0".to_string(),
            message: Some("Wetin dey sup?".to_string()),
        };

        let greeting = greeting_message(&summary).expect("greeting should be present");
        assert_eq!(greeting.sender, chat_backend::Sender::Assistant);
        assert_eq!(greeting.content, "Wetin dey sup?");
        assert_eq!(greeting.created_at, "t0");
        assert!(greeting.id.starts_with("local-"));
    }

    #[test]
    fn blank_greeting_is_dropped() {
        let summary = ConversationSummary {
            id: "new1".to_string(),
            created_at: "t0".to_string(),
            message: Some("  ".to_string()),
        };
        assert_eq!(greeting_message(&summary), None);
    }
}
