//! Dismissible user notifications.
//!
//! Transient failures surface as notices (message plus success/error
//! tag) rather than blocking dialogs; nothing here is fatal to the
//! running session.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Tag deciding how the UI renders a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// One dismissible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Default)]
struct NotifierInner {
    next_id: u64,
    notices: Vec<Notice>,
}

/// Thread-safe list of active notices.
#[derive(Debug, Default)]
pub struct Notifier {
    inner: Mutex<NotifierInner>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a notice; returns its id for later dismissal.
    pub fn push(&self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let mut inner = self.inner.lock().expect("notifier lock poisoned");
        inner.next_id += 1;
        let id = inner.next_id;
        inner.notices.push(Notice {
            id,
            kind,
            message: message.into(),
        });
        id
    }

    /// Remove one notice; unknown ids are ignored.
    pub fn dismiss(&self, id: u64) {
        self.inner
            .lock()
            .expect("notifier lock poisoned")
            .notices
            .retain(|n| n.id != id);
    }

    /// Currently visible notices, oldest first.
    pub fn active(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .expect("notifier lock poisoned")
            .notices
            .clone()
    }
}
