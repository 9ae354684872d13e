//! Transient user-visible notices (toasts).

use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Destination for notices. Presentation decides how they are shown.
pub trait NoticeSink: Send {
    fn notify(&mut self, notice: Notice);
}

impl NoticeSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// Shared notice buffer, for when the sink must outlive the view that fills it.
#[derive(Debug, Clone, Default)]
pub struct SharedNotices {
    inner: Arc<Mutex<Vec<Notice>>>,
}

impl SharedNotices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every buffered notice.
    pub fn take(&self) -> Vec<Notice> {
        let mut notices = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *notices)
    }
}

impl NoticeSink for SharedNotices {
    fn notify(&mut self, notice: Notice) {
        match self.inner.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
