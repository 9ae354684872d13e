//! Chat view lifecycle.
//!
//! Constructing a [`ChatView`] is "mount": it resolves the session exactly
//! once. Dropping it is "unmount": the transcript is discarded and any sends
//! still in flight complete into a queue nobody drains.

use std::sync::Arc;
use std::time::Duration;

use chat_backend::{ChatBackend, ConversationId};

use crate::dispatch::{DispatchEvent, Dispatcher, SubmissionId};
use crate::location::Navigator;
use crate::notice::NoticeSink;
use crate::resolver::{ResolverState, SessionOrigin, SessionResolver};
use crate::transcript::Transcript;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Ready,
    /// Unrecoverable load error; the view accepts no input.
    Failed(String),
}

struct ActiveSession {
    conversation_id: ConversationId,
    origin: SessionOrigin,
    dispatcher: Dispatcher,
}

pub struct ChatView {
    state: ViewState,
    session: Option<ActiveSession>,
    transcript: Transcript,
    transitions: Vec<ResolverState>,
    notices: Box<dyn NoticeSink>,
}

impl ChatView {
    /// Mounts a view for the navigator's current location.
    pub fn mount(
        backend: Arc<dyn ChatBackend>,
        navigator: &dyn Navigator,
        mut notices: Box<dyn NoticeSink>,
    ) -> Self {
        let mut resolver = SessionResolver::new();
        let resolved = resolver.resolve(backend.as_ref(), navigator, &mut *notices);
        let transitions = resolver.transitions().to_vec();

        match resolved {
            Ok(resolved) => {
                let mut transcript = Transcript::new();
                transcript.replace_all(resolved.messages);
                tracing::debug!(
                    conversation_id = %resolved.conversation_id,
                    origin = ?resolved.origin,
                    messages = transcript.len(),
                    "chat view ready"
                );

                Self {
                    state: ViewState::Ready,
                    session: Some(ActiveSession {
                        dispatcher: Dispatcher::new(backend, resolved.conversation_id.clone()),
                        conversation_id: resolved.conversation_id,
                        origin: resolved.origin,
                    }),
                    transcript,
                    transitions,
                    notices,
                }
            }
            Err(error) => Self {
                state: ViewState::Failed(error.to_string()),
                session: None,
                transcript: Transcript::new(),
                transitions,
                notices,
            },
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ViewState::Ready
    }

    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|session| session.conversation_id.as_str())
    }

    #[must_use]
    pub fn origin(&self) -> Option<SessionOrigin> {
        self.session.as_ref().map(|session| session.origin)
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Resolver states entered while mounting.
    #[must_use]
    pub fn resolver_transitions(&self) -> &[ResolverState] {
        &self.transitions
    }

    /// Submits user input. Returns `None` for blank input or a failed view.
    pub fn submit(&mut self, text: &str) -> Option<SubmissionId> {
        let session = self.session.as_mut()?;
        session.dispatcher.submit(&mut self.transcript, text)
    }

    /// Applies every queued send outcome to the transcript, in arrival order,
    /// and returns the applied events.
    pub fn drain_events(&mut self) -> Vec<DispatchEvent> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };

        let events = session.dispatcher.take_events();
        for event in &events {
            session
                .dispatcher
                .apply(event, &mut self.transcript, &mut *self.notices);
        }
        events
    }

    /// Waits up to `timeout` for a send outcome to become drainable.
    pub fn wait_for_events(&self, timeout: Duration) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.dispatcher.wait_for_events(timeout))
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| session.dispatcher.in_flight())
    }
}
