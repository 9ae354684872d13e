//! Deterministic in-memory implementation of the shared `chat_backend` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level integration testing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chat_backend::{
    BackendError, BackendProfile, ChatBackend, Conversation, ConversationSummary, Message,
};

/// Stable backend identifier used for explicit startup selection.
pub const MOCK_BACKEND_ID: &str = "mock";

/// Backend operations that can be observed or made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    List,
    Create,
    Get,
    Send,
    Delete,
}

/// One observed backend call, recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    List,
    Create,
    Get { conversation_id: String },
    Send { conversation_id: String, content: String },
    Delete { conversation_id: String },
}

impl MockCall {
    #[must_use]
    pub fn operation(&self) -> MockOperation {
        match self {
            Self::List => MockOperation::List,
            Self::Create => MockOperation::Create,
            Self::Get { .. } => MockOperation::Get,
            Self::Send { .. } => MockOperation::Send,
            Self::Delete { .. } => MockOperation::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    conversations: Vec<Conversation>,
    next_conversation: u64,
    next_message: u64,
    next_reply: usize,
    clock: u64,
    failures: HashMap<MockOperation, usize>,
    calls: Vec<MockCall>,
}

impl MockState {
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!(
            "2024-01-01T00:{:02}:{:02}Z",
            (self.clock / 60) % 60,
            self.clock % 60
        )
    }

    fn next_message_id(&mut self) -> String {
        self.next_message += 1;
        format!("msg-{}", self.next_message)
    }

    fn take_failure(&mut self, operation: MockOperation) -> bool {
        match self.failures.get_mut(&operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    fn find_mut(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|conversation| conversation.id == conversation_id)
    }
}

/// Deterministic mock backend used by `chat_session` tests and local runs.
///
/// Conversations are numbered `chat-1`, `chat-2`, ... and assistant replies
/// rotate through the configured list.
#[derive(Debug)]
pub struct MockBackend {
    replies: Vec<String>,
    greeting: Option<String>,
    reply_delay: Duration,
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Creates a mock backend with caller-provided replies and no greeting.
    #[must_use]
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: sanitize_replies(replies),
            greeting: None,
            reply_delay: Duration::ZERO,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Returns a first assistant message inline from every create call.
    #[must_use]
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        self.greeting = (!greeting.trim().is_empty()).then_some(greeting);
        self
    }

    /// Sleeps before answering each `send_message` call.
    #[must_use]
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Seeds an existing conversation, as if created earlier.
    #[must_use]
    pub fn with_conversation(self, conversation: Conversation) -> Self {
        lock_unpoisoned(&self.state)
            .conversations
            .push(conversation);
        self
    }

    /// Makes the next `count` calls of `operation` fail with a generic error.
    pub fn fail_next(&self, operation: MockOperation, count: usize) {
        let mut state = lock_unpoisoned(&self.state);
        *state.failures.entry(operation).or_default() += count;
    }

    /// Returns every call observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        lock_unpoisoned(&self.state).calls.clone()
    }

    /// Returns how many calls of `operation` were observed.
    #[must_use]
    pub fn call_count(&self, operation: MockOperation) -> usize {
        lock_unpoisoned(&self.state)
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Returns a snapshot of a stored conversation.
    #[must_use]
    pub fn conversation(&self, conversation_id: &str) -> Option<Conversation> {
        lock_unpoisoned(&self.state)
            .conversations
            .iter()
            .find(|conversation| conversation.id == conversation_id)
            .cloned()
    }

    fn begin(&self, call: MockCall) -> Result<MutexGuard<'_, MockState>, BackendError> {
        let operation = call.operation();
        let mut state = lock_unpoisoned(&self.state);
        state.calls.push(call);
        if state.take_failure(operation) {
            return Err(BackendError::other(format!(
                "mock backend failure injected for {operation:?}"
            )));
        }
        Ok(state)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(vec![
            "I understand what you're saying.".to_string(),
            "That's interesting! Tell me more.".to_string(),
            "I'm here to help you.".to_string(),
            "Let me think about that...".to_string(),
            "Could you elaborate on that?".to_string(),
        ])
    }
}

impl ChatBackend for MockBackend {
    fn profile(&self) -> BackendProfile {
        BackendProfile {
            backend_id: MOCK_BACKEND_ID.to_string(),
            endpoint: None,
        }
    }

    fn list_conversations(&self) -> Result<Vec<ConversationSummary>, BackendError> {
        let state = self.begin(MockCall::List)?;
        Ok(state
            .conversations
            .iter()
            .map(|conversation| ConversationSummary {
                id: conversation.id.clone(),
                created_at: conversation.created_at.clone(),
                message: conversation
                    .messages
                    .first()
                    .map(|message| message.content.clone()),
            })
            .collect())
    }

    fn create_conversation(&self) -> Result<ConversationSummary, BackendError> {
        let mut state = self.begin(MockCall::Create)?;
        state.next_conversation += 1;
        let id = format!("chat-{}", state.next_conversation);
        let created_at = state.tick();

        let mut messages = Vec::new();
        if let Some(greeting) = &self.greeting {
            let message_id = state.next_message_id();
            messages.push(Message::assistant(message_id, greeting.clone(), created_at.clone()));
        }

        state.conversations.push(Conversation {
            id: id.clone(),
            created_at: created_at.clone(),
            messages,
        });

        Ok(ConversationSummary {
            id,
            created_at,
            message: self.greeting.clone(),
        })
    }

    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation, BackendError> {
        let mut state = self.begin(MockCall::Get {
            conversation_id: conversation_id.to_string(),
        })?;
        state
            .find_mut(conversation_id)
            .map(|conversation| conversation.clone())
            .ok_or_else(|| BackendError::not_found("Chat not found"))
    }

    fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message, BackendError> {
        {
            let mut state = self.begin(MockCall::Send {
                conversation_id: conversation_id.to_string(),
                content: content.to_string(),
            })?;
            if state.find_mut(conversation_id).is_none() {
                return Err(BackendError::not_found("Chat not found"));
            }
        }

        if !self.reply_delay.is_zero() {
            thread::sleep(self.reply_delay);
        }

        let mut state = lock_unpoisoned(&self.state);
        let user_id = state.next_message_id();
        let user_at = state.tick();
        let reply_id = state.next_message_id();
        let reply_at = state.tick();
        let reply_text = self.replies[state.next_reply % self.replies.len()].clone();
        state.next_reply += 1;

        let reply = Message::assistant(reply_id, reply_text, reply_at);
        let Some(conversation) = state.find_mut(conversation_id) else {
            return Err(BackendError::not_found("Chat not found"));
        };
        conversation
            .messages
            .push(Message::user(user_id, content, user_at));
        conversation.messages.push(reply.clone());

        Ok(reply)
    }

    fn delete_conversation(&self, conversation_id: &str) -> Result<(), BackendError> {
        let mut state = self.begin(MockCall::Delete {
            conversation_id: conversation_id.to_string(),
        })?;
        let before = state.conversations.len();
        state
            .conversations
            .retain(|conversation| conversation.id != conversation_id);
        if state.conversations.len() == before {
            return Err(BackendError::not_found("Chat not found"));
        }
        Ok(())
    }
}

fn sanitize_replies(replies: Vec<String>) -> Vec<String> {
    let mut sanitized: Vec<String> = replies
        .into_iter()
        .filter(|reply| !reply.trim().is_empty())
        .collect();

    if sanitized.is_empty() {
        sanitized.push("ok".to_string());
    }

    sanitized
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use chat_backend::{BackendErrorKind, Sender};

    use super::*;

    #[test]
    fn profile_exposes_mock_backend_identity() {
        let profile = MockBackend::default().profile();

        assert_eq!(profile.backend_id, MOCK_BACKEND_ID);
        assert_eq!(profile.endpoint, None);
    }

    #[test]
    fn create_assigns_sequential_ids_and_optional_greeting() {
        let plain = MockBackend::default();
        let first = plain.create_conversation().expect("create should succeed");
        let second = plain.create_conversation().expect("create should succeed");
        assert_eq!(first.id, "chat-1");
        assert_eq!(second.id, "chat-2");
        assert_eq!(first.message, None);

        let greeted = MockBackend::default().with_greeting("Wetin dey sup?");
        let created = greeted.create_conversation().expect("create should succeed");
        assert_eq!(created.message.as_deref(), Some("Wetin dey sup?"));

        let stored = greeted
            .get_conversation(&created.id)
            .expect("created conversation should be stored");
        assert_eq!(stored.messages.len(), 1);
        assert_eq!(stored.messages[0].sender, Sender::Assistant);
    }

    #[test]
    fn send_rotates_replies_and_stores_both_sides() {
        let backend = MockBackend::new(vec!["one".to_string(), "two".to_string()]);
        let id = backend.create_conversation().expect("create").id;

        let first = backend.send_message(&id, "hi").expect("send should succeed");
        let second = backend.send_message(&id, "again").expect("send should succeed");
        let third = backend.send_message(&id, "more").expect("send should succeed");

        assert_eq!(first.content, "one");
        assert_eq!(second.content, "two");
        assert_eq!(third.content, "one");

        let stored = backend.get_conversation(&id).expect("get should succeed");
        let senders: Vec<Sender> = stored.messages.iter().map(|message| message.sender).collect();
        assert_eq!(
            senders,
            vec![
                Sender::User,
                Sender::Assistant,
                Sender::User,
                Sender::Assistant,
                Sender::User,
                Sender::Assistant,
            ]
        );
    }

    #[test]
    fn unknown_conversation_reports_not_found() {
        let backend = MockBackend::default();

        let error = backend
            .get_conversation("missing")
            .expect_err("missing conversation should fail");
        assert_eq!(error.kind(), BackendErrorKind::NotFound);

        let error = backend
            .send_message("missing", "hi")
            .expect_err("missing conversation should fail");
        assert_eq!(error.kind(), BackendErrorKind::NotFound);
    }

    #[test]
    fn injected_failures_are_consumed_in_order() {
        let backend = MockBackend::default();
        backend.fail_next(MockOperation::Create, 1);

        let error = backend
            .create_conversation()
            .expect_err("first create should fail");
        assert_eq!(error.kind(), BackendErrorKind::Other);
        assert!(backend.create_conversation().is_ok());
        assert_eq!(backend.call_count(MockOperation::Create), 2);
    }

    #[test]
    fn delete_removes_conversation_from_listing() {
        let backend = MockBackend::default();
        let id = backend.create_conversation().expect("create").id;
        assert_eq!(backend.list_conversations().expect("list").len(), 1);

        backend.delete_conversation(&id).expect("delete should succeed");

        assert!(backend.list_conversations().expect("list").is_empty());
        assert!(backend
            .delete_conversation(&id)
            .expect_err("second delete should fail")
            .is_not_found());
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let backend = MockBackend::default().with_conversation(Conversation {
            id: "abc123".to_string(),
            created_at: "t0".to_string(),
            messages: Vec::new(),
        });

        let _ = backend.get_conversation("abc123");
        let _ = backend.send_message("abc123", "yo");

        assert_eq!(
            backend.calls(),
            vec![
                MockCall::Get {
                    conversation_id: "abc123".to_string(),
                },
                MockCall::Send {
                    conversation_id: "abc123".to_string(),
                    content: "yo".to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_reply_list_falls_back_to_safe_default() {
        let backend = MockBackend::new(vec!["   ".to_string()]);
        let id = backend.create_conversation().expect("create").id;

        let reply = backend.send_message(&id, "hi").expect("send should succeed");
        assert_eq!(reply.content, "ok");
    }
}
