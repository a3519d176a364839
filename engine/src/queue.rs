//! The persisted queue of unsent form submissions.
//!
//! A completed form becomes one queue entry, whether or not the device
//! is online at the time; the sync engine drains the queue when
//! connectivity returns. Entries are kept FIFO and an entry only leaves
//! the queue after the remote store confirms it.

use crate::clock::{Clock, SystemClock};
use crate::gateway::{
    FIS_ANSWERS_LIST_TABLE, FIS_ANSWERS_TABLE, FPR_ANSWERS_LIST_TABLE, FPR_ANSWERS_TABLE,
};
use crate::storage::{load_json, LocalStore, OFFLINE_SUBMISSIONS_KEY};
use crate::value::AnswerMap;
use crate::FormId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The two form families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormType {
    /// Family Progress Report
    #[serde(rename = "FPR")]
    Fpr,
    /// Family Introduction Sheet
    #[serde(rename = "FIS")]
    Fis,
}

impl FormType {
    /// Table holding one parent row per submission.
    pub fn parent_table(&self) -> &'static str {
        match self {
            FormType::Fpr => FPR_ANSWERS_TABLE,
            FormType::Fis => FIS_ANSWERS_TABLE,
        }
    }

    /// Table holding one row per question/answer pair.
    pub fn list_table(&self) -> &'static str {
        match self {
            FormType::Fpr => FPR_ANSWERS_LIST_TABLE,
            FormType::Fis => FIS_ANSWERS_LIST_TABLE,
        }
    }
}

/// A completed form, as handed over by the UI on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub form_id: FormId,
    pub form_type: FormType,
    /// Subject display name; only Family Introduction Sheets carry it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    pub answers: AnswerMap,
    /// Identity of the person who filled the form out.
    pub filled_out_by: String,
    /// Identity of the family/child the form is about.
    pub subject_id: String,
}

/// One queue entry: a payload plus the enqueue timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSubmission {
    #[serde(flatten)]
    pub payload: SubmissionPayload,
    /// RFC 3339, generated at enqueue time.
    pub timestamp: String,
}

/// FIFO queue of unsent submissions over a [`LocalStore`].
///
/// Every mutation is a read-modify-write of the whole persisted list;
/// concurrent enqueue from multiple tabs is explicitly unsupported.
pub struct SubmissionQueue {
    store: Arc<dyn LocalStore>,
    clock: Arc<dyn Clock>,
}

impl SubmissionQueue {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Queue with an injected time source; timestamps become
    /// deterministic under test.
    pub fn with_clock(store: Arc<dyn LocalStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append a completed form to the persisted queue.
    pub fn enqueue(&self, payload: SubmissionPayload) {
        let mut entries = self.entries();
        entries.push(OfflineSubmission {
            payload,
            timestamp: self.clock.now().to_rfc3339(),
        });
        self.persist(&entries);
        tracing::debug!(queued = entries.len(), "submission saved to offline queue");
    }

    /// The persisted queue, oldest first. Corrupt data is logged and
    /// treated as empty.
    pub fn entries(&self) -> Vec<OfflineSubmission> {
        load_json(self.store.as_ref(), OFFLINE_SUBMISSIONS_KEY)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Overwrite the persisted queue with exactly `entries`.
    pub(crate) fn persist(&self, entries: &[OfflineSubmission]) {
        match serde_json::to_string(entries) {
            Ok(json) => self.store.save(OFFLINE_SUBMISSIONS_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize offline queue"),
        }
    }

    /// Remove the queue key entirely.
    pub(crate) fn remove_key(&self) {
        self.store.clear(OFFLINE_SUBMISSIONS_KEY);
    }
}
