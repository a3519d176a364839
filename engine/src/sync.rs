//! Sync engine - replays the offline queue against the remote store.
//!
//! Runs when connectivity returns. Entries are submitted strictly in
//! queue order, one at a time; failures are collected and written back
//! so the queue only ever shrinks during a pass.

use crate::error::{Error, Result};
use crate::gateway::RemoteGateway;
use crate::notify::{NoticeKind, Notifier};
use crate::queue::{FormType, OfflineSubmission, SubmissionQueue};
use serde::Serialize;
use serde_json::{json, Value};

/// What a sync pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
}

impl SyncOutcome {
    fn empty() -> Self {
        Self {
            attempted: 0,
            synced: 0,
            failed: 0,
        }
    }
}

/// Drain the offline queue against the remote store.
///
/// An empty queue is a normal no-op. Each entry is all-or-nothing for
/// retry purposes: if any step of its submission fails, the whole entry
/// stays queued and is retried in full on the next pass. After the
/// pass, the persisted queue holds exactly the failed entries in their
/// original relative order - or the key is removed when everything
/// succeeded. The outcome is also surfaced as a dismissible notice.
pub async fn sync_offline_queue(
    queue: &SubmissionQueue,
    gateway: &dyn RemoteGateway,
    notifier: &Notifier,
) -> SyncOutcome {
    let entries = queue.entries();
    if entries.is_empty() {
        tracing::debug!("offline queue empty, nothing to sync");
        return SyncOutcome::empty();
    }

    let attempted = entries.len();
    tracing::info!(attempted, "syncing offline queue");

    let mut retry = Vec::new();
    for entry in entries {
        if let Err(e) = submit_entry(gateway, &entry).await {
            tracing::warn!(form_id = %entry.payload.form_id, error = %e, "submission failed, keeping in queue");
            retry.push(entry);
        }
    }

    let failed = retry.len();
    if retry.is_empty() {
        queue.remove_key();
        notifier.push(NoticeKind::Success, "All queued submissions synced.");
    } else {
        queue.persist(&retry);
        notifier.push(
            NoticeKind::Error,
            format!("{failed} submission(s) failed to sync and will be retried."),
        );
    }

    SyncOutcome {
        attempted,
        synced: attempted - failed,
        failed,
    }
}

/// Submit one queue entry: two sequential writes, no transaction.
///
/// 1. Insert the parent answer row and read back its generated
///    identifier.
/// 2. Insert one list row per question/answer pair, referencing the
///    parent identifier; array answers are stored as JSON text.
///
/// Failure at either step aborts the entry. A step-2 failure leaves the
/// parent row orphaned and the retry will insert a fresh parent - a
/// known limitation of the per-call atomicity of the remote store.
pub async fn submit_entry(gateway: &dyn RemoteGateway, entry: &OfflineSubmission) -> Result<()> {
    let payload = &entry.payload;
    let parent_table = payload.form_type.parent_table();
    let list_table = payload.form_type.list_table();

    let parent_row = match payload.form_type {
        FormType::Fpr => json!({
            "form_id": payload.form_id,
            "filled_out_by": payload.filled_out_by,
            "sc_id": payload.subject_id,
            "child_id": payload.subject_id,
        }),
        FormType::Fis => json!({
            "form_id": payload.form_id,
            "sc_name": payload.subject_name,
            "filled_out_by": payload.filled_out_by,
        }),
    };

    let inserted = gateway.insert(parent_table, vec![parent_row]).await?;
    let parent_id = inserted
        .first()
        .and_then(|row| row.get("answer_id"))
        .filter(|id| !id.is_null())
        .cloned()
        .ok_or_else(|| Error::MissingInsertId {
            table: parent_table.to_string(),
        })?;

    let list_rows: Vec<Value> = payload
        .answers
        .iter()
        .map(|(question_id, answer)| {
            json!({
                "answer_id": parent_id,
                "question_id": question_id,
                "answer": answer.to_column_value(),
            })
        })
        .collect();

    if !list_rows.is_empty() {
        gateway.insert(list_table, list_rows).await?;
    }

    tracing::debug!(form_id = %payload.form_id, "submission accepted by remote store");
    Ok(())
}
