#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chat_backend::{
    BackendError, BackendProfile, ChatBackend, Conversation, ConversationSummary, Message,
};
use chat_session::{ChatView, MemoryNavigator, SharedNotices};

/// Backend call as observed by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create,
    Get(String),
    Send(String, String),
    Delete(String),
}

#[derive(Default)]
struct Script {
    creates: VecDeque<Result<ConversationSummary, BackendError>>,
    gets: VecDeque<Result<Conversation, BackendError>>,
    sends: VecDeque<Result<Message, BackendError>>,
    gates: HashMap<String, Receiver<()>>,
    calls: Vec<Call>,
}

/// Backend that answers from per-operation scripts and records every call.
///
/// Sends for content registered with [`ScriptedBackend::gate_send`] block
/// until the returned release handle fires.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_create(&self, result: Result<ConversationSummary, BackendError>) {
        self.lock().creates.push_back(result);
    }

    pub fn push_get(&self, result: Result<Conversation, BackendError>) {
        self.lock().gets.push_back(result);
    }

    pub fn push_send(&self, result: Result<Message, BackendError>) {
        self.lock().sends.push_back(result);
    }

    pub fn gate_send(&self, content: &str) -> Sender<()> {
        let (release, gate) = mpsc::channel();
        self.lock().gates.insert(content.to_string(), gate);
        release
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ChatBackend for ScriptedBackend {
    fn profile(&self) -> BackendProfile {
        BackendProfile {
            backend_id: "scripted".to_string(),
            endpoint: None,
        }
    }

    fn list_conversations(&self) -> Result<Vec<ConversationSummary>, BackendError> {
        self.lock().calls.push(Call::List);
        Ok(Vec::new())
    }

    fn create_conversation(&self) -> Result<ConversationSummary, BackendError> {
        let mut script = self.lock();
        script.calls.push(Call::Create);
        script
            .creates
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::other("unscripted create")))
    }

    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation, BackendError> {
        let mut script = self.lock();
        script.calls.push(Call::Get(conversation_id.to_string()));
        script
            .gets
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::other("unscripted get")))
    }

    fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message, BackendError> {
        let gate = {
            let mut script = self.lock();
            script
                .calls
                .push(Call::Send(conversation_id.to_string(), content.to_string()));
            script.gates.remove(content)
        };

        if let Some(gate) = gate {
            let _ = gate.recv_timeout(Duration::from_secs(10));
        }

        self.lock()
            .sends
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::other("unscripted send")))
    }

    fn delete_conversation(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.lock().calls.push(Call::Delete(conversation_id.to_string()));
        Ok(())
    }
}

pub fn summary(id: &str, created_at: &str, message: Option<&str>) -> ConversationSummary {
    ConversationSummary {
        id: id.to_string(),
        created_at: created_at.to_string(),
        message: message.map(str::to_string),
    }
}

pub fn conversation(id: &str, messages: Vec<Message>) -> Conversation {
    Conversation {
        id: id.to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        messages,
    }
}

/// Mounts a view at `path` and returns it with its navigator and notices.
pub fn mount_at(
    backend: Arc<dyn ChatBackend>,
    path: &str,
) -> (ChatView, MemoryNavigator, SharedNotices) {
    let navigator = MemoryNavigator::new(path);
    let notices = SharedNotices::new();
    let view = ChatView::mount(backend, &navigator, Box::new(notices.clone()));
    (view, navigator, notices)
}

/// Waits until nothing is in flight, then drains.
pub fn settle(view: &mut ChatView) {
    for _ in 0..100 {
        if view.in_flight() == 0 {
            break;
        }
        view.wait_for_events(Duration::from_millis(100));
    }
    view.drain_events();
}
