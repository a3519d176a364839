//! Reactive answer state.
//!
//! An observable map from question id to answer value, synchronized to
//! local persistence on every change. Observers get an explicit
//! subscribe/notify contract; there is no ambient global state.

use crate::storage::{load_json, LocalStore, OFFLINE_ANSWERS_KEY};
use crate::value::{AnswerMap, AnswerValue};
use crate::QuestionId;
use std::sync::Arc;

/// Callback invoked after every state change with the full snapshot.
pub type AnswerListener = Box<dyn Fn(&AnswerMap) + Send + Sync>;

/// The in-progress answers for the form currently being filled out.
///
/// Persistence ordering invariant: snapshots are only written to the
/// local store after [`AnswerState::load_offline_answers`] has run.
/// Without the guard, an empty initial state could clobber the
/// persisted answers before the load completes.
pub struct AnswerState {
    store: Arc<dyn LocalStore>,
    answers: AnswerMap,
    loaded: bool,
    listeners: Vec<AnswerListener>,
}

impl AnswerState {
    /// Create empty state over the given storage medium.
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            answers: AnswerMap::new(),
            loaded: false,
            listeners: Vec::new(),
        }
    }

    /// Restore the persisted snapshot and arm persistence.
    ///
    /// Corrupt stored data is logged and treated as empty. After this
    /// call every mutation writes the current snapshot back to storage.
    pub fn load_offline_answers(&mut self) {
        self.answers = load_json(self.store.as_ref(), OFFLINE_ANSWERS_KEY);
        self.loaded = true;
        self.notify();
    }

    /// Whether the initial load has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Register an observer; it fires after every subsequent change.
    pub fn subscribe(&mut self, listener: AnswerListener) {
        self.listeners.push(listener);
    }

    /// Replace the whole state (used on initial population from the UI).
    pub fn set(&mut self, answers: AnswerMap) {
        self.answers = answers;
        self.after_change();
    }

    /// Record one answer.
    pub fn insert(&mut self, question_id: impl Into<QuestionId>, value: AnswerValue) {
        self.answers.insert(question_id.into(), value);
        self.after_change();
    }

    /// Remove one answer.
    pub fn remove(&mut self, question_id: &str) {
        if self.answers.remove(question_id).is_some() {
            self.after_change();
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    /// Current snapshot.
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Reset to empty and remove the persisted key.
    ///
    /// Called after a successful submission or an explicit reset.
    /// Idempotent: a second call leaves state and storage unchanged.
    pub fn clear_answers(&mut self) {
        self.answers.clear();
        self.store.clear(OFFLINE_ANSWERS_KEY);
        self.notify();
    }

    fn after_change(&self) {
        self.notify();
        if self.loaded {
            self.persist();
        }
    }

    fn persist(&self) {
        match serde_json::to_string(&self.answers) {
            Ok(json) => self.store.save(OFFLINE_ANSWERS_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize answer snapshot"),
        }
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.answers);
        }
    }
}
