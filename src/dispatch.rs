//! Optimistic message dispatch.
//!
//! A submission appends the user's message to the transcript immediately and
//! sends it on a worker thread. Workers never touch the transcript: they queue
//! a [`DispatchEvent`] which the view owner applies when it drains the queue
//! on its own loop turn. Events are applied in the order workers finished.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use chat_backend::{BackendError, ChatBackend, ConversationId, Message};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::notice::{Notice, NoticeSink};
use crate::transcript::Transcript;

/// Per-view sequence number identifying one submission in logs and events.
pub type SubmissionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// The backend answered; the reply is appended when applied.
    Reconciled {
        submission_id: SubmissionId,
        reply: Message,
    },
    /// The send failed; the optimistic user message stays in place.
    Failed {
        submission_id: SubmissionId,
        error: BackendError,
    },
}

impl DispatchEvent {
    #[must_use]
    pub fn submission_id(&self) -> SubmissionId {
        match self {
            Self::Reconciled { submission_id, .. } | Self::Failed { submission_id, .. } => {
                *submission_id
            }
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    events: VecDeque<DispatchEvent>,
    in_flight: usize,
}

#[derive(Debug, Default)]
struct EventQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl EventQueue {
    fn begin(&self) {
        lock_unpoisoned(&self.state).in_flight += 1;
    }

    fn complete(&self, event: DispatchEvent) {
        {
            let mut state = lock_unpoisoned(&self.state);
            state.in_flight = state.in_flight.saturating_sub(1);
            state.events.push_back(event);
        }
        self.ready.notify_all();
    }
}

/// Sends user messages for one conversation in the background.
pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
    conversation_id: ConversationId,
    queue: Arc<EventQueue>,
    next_submission_id: SubmissionId,
}

impl Dispatcher {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>, conversation_id: impl Into<ConversationId>) -> Self {
        Self {
            backend,
            conversation_id: conversation_id.into(),
            queue: Arc::new(EventQueue::default()),
            next_submission_id: 1,
        }
    }

    #[must_use]
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Appends the trimmed text as a user message and starts sending it.
    ///
    /// Blank input is ignored: nothing is appended or sent and `None` is
    /// returned.
    pub fn submit(&mut self, transcript: &mut Transcript, text: &str) -> Option<SubmissionId> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }

        let submission_id = self.next_submission_id;
        self.next_submission_id += 1;

        transcript.append(provisional_user_message(content));
        self.queue.begin();
        tracing::debug!(
            submission_id,
            conversation_id = %self.conversation_id,
            "dispatching message"
        );

        let backend = Arc::clone(&self.backend);
        let queue = Arc::clone(&self.queue);
        let conversation_id = self.conversation_id.clone();
        let content = content.to_string();
        let spawned = thread::Builder::new()
            .name(format!("chat-send-{submission_id}"))
            .spawn(move || {
                let event = send_worker(backend.as_ref(), &conversation_id, &content, submission_id);
                queue.complete(event);
            });

        if let Err(error) = spawned {
            self.queue.complete(DispatchEvent::Failed {
                submission_id,
                error: BackendError::other(format!("Failed to spawn send worker: {error}")),
            });
        }

        Some(submission_id)
    }

    /// Removes every queued event, in arrival order.
    pub fn take_events(&self) -> Vec<DispatchEvent> {
        lock_unpoisoned(&self.queue.state).events.drain(..).collect()
    }

    /// Applies one event to the transcript.
    pub fn apply(
        &self,
        event: &DispatchEvent,
        transcript: &mut Transcript,
        notices: &mut dyn NoticeSink,
    ) {
        match event {
            DispatchEvent::Reconciled { reply, .. } => transcript.append(reply.clone()),
            DispatchEvent::Failed {
                submission_id,
                error,
            } => {
                tracing::warn!(
                    submission_id,
                    conversation_id = %self.conversation_id,
                    kind = ?error.kind(),
                    %error,
                    "failed to send message"
                );
                notices.notify(Notice::error(format!("Failed to send message: {error}")));
            }
        }
    }

    /// Blocks until an event is queued, nothing is in flight, or `timeout`
    /// elapses. Returns whether events are ready to drain.
    pub fn wait_for_events(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = lock_unpoisoned(&self.queue.state);

        while state.events.is_empty() && state.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            state = match self.queue.ready.wait_timeout(state, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }

        !state.events.is_empty()
    }

    /// Number of sends whose outcome has not been queued yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        lock_unpoisoned(&self.queue.state).in_flight
    }

    /// Number of queued events not yet drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock_unpoisoned(&self.queue.state).events.len()
    }
}

fn send_worker(
    backend: &dyn ChatBackend,
    conversation_id: &str,
    content: &str,
    submission_id: SubmissionId,
) -> DispatchEvent {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        backend.send_message(conversation_id, content)
    }));

    match outcome {
        Ok(Ok(reply)) => DispatchEvent::Reconciled {
            submission_id,
            reply,
        },
        Ok(Err(error)) => DispatchEvent::Failed {
            submission_id,
            error,
        },
        Err(_) => DispatchEvent::Failed {
            submission_id,
            error: BackendError::other("Chat backend panicked"),
        },
    }
}

fn provisional_user_message(content: &str) -> Message {
    let created_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Message::user(format!("local-{}", uuid::Uuid::new_v4()), content, created_at)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use chat_backend::{BackendProfile, Conversation, ConversationSummary, Sender};

    use super::*;

    struct PanickingBackend;

    impl ChatBackend for PanickingBackend {
        fn profile(&self) -> BackendProfile {
            BackendProfile {
                backend_id: "panic".to_string(),
                endpoint: None,
            }
        }

        fn list_conversations(&self) -> Result<Vec<ConversationSummary>, BackendError> {
            Ok(Vec::new())
        }

        fn create_conversation(&self) -> Result<ConversationSummary, BackendError> {
            Err(BackendError::other("unused"))
        }

        fn get_conversation(&self, _conversation_id: &str) -> Result<Conversation, BackendError> {
            Err(BackendError::other("unused"))
        }

        fn send_message(&self, _conversation_id: &str, _content: &str) -> Result<Message, BackendError> {
            panic!("backend exploded");
        }
    }

    #[test]
    fn provisional_message_is_user_authored_with_local_id() {
        let message = provisional_user_message("yo");

        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.content, "yo");
        assert!(message.id.starts_with("local-"));
        assert!(OffsetDateTime::parse(&message.created_at, &Rfc3339).is_ok());
    }

    #[test]
    fn panicking_backend_is_reported_as_failure() {
        let mut dispatcher = Dispatcher::new(Arc::new(PanickingBackend), "c1");
        let mut transcript = Transcript::new();

        let submission_id = dispatcher
            .submit(&mut transcript, "boom")
            .expect("non-blank text should dispatch");
        assert!(dispatcher.wait_for_events(Duration::from_secs(5)));

        let events = dispatcher.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].submission_id(), submission_id);
        assert!(matches!(
            &events[0],
            DispatchEvent::Failed { error, .. } if error.message() == "Chat backend panicked"
        ));
        assert_eq!(dispatcher.in_flight(), 0);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn submission_ids_increase_per_dispatcher() {
        let mut dispatcher = Dispatcher::new(Arc::new(PanickingBackend), "c1");
        let mut transcript = Transcript::new();

        let first = dispatcher.submit(&mut transcript, "a");
        let blank = dispatcher.submit(&mut transcript, "   ");
        let second = dispatcher.submit(&mut transcript, "b");

        assert_eq!(first, Some(1));
        assert_eq!(blank, None);
        assert_eq!(second, Some(2));
    }

    #[test]
    fn wait_returns_immediately_when_idle() {
        let dispatcher = Dispatcher::new(Arc::new(PanickingBackend), "c1");
        let started = Instant::now();

        assert!(!dispatcher.wait_for_events(Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
