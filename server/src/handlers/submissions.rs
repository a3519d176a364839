//! Submission intake handler - accepts a client's offline queue.
//!
//! Clients push their whole persisted queue in one request. Entries
//! are processed strictly in order; each is accepted or rejected on
//! its own, so one bad entry does not block the rest. Rejected entries
//! stay in the client's queue for the next push.

use crate::error::Result;
use famlink_engine::{submit_entry, OfflineSubmission, RemoteGateway};
use serde::{Deserialize, Serialize};

/// Request body for pushing queued submissions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    pub submissions: Vec<OfflineSubmission>,
}

/// Response for pushing queued submissions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    /// Indexes (into the request list) that were stored.
    pub accepted: Vec<usize>,
    /// Entries that failed, with the reason.
    pub rejected: Vec<RejectedSubmission>,
}

/// A rejected submission with reason.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedSubmission {
    pub index: usize,
    pub reason: String,
}

/// Store each pushed submission.
pub async fn handle_intake(
    gateway: &dyn RemoteGateway,
    request: IntakeRequest,
) -> Result<IntakeResponse> {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, entry) in request.submissions.iter().enumerate() {
        match submit_entry(gateway, entry).await {
            Ok(()) => accepted.push(index),
            Err(e) => {
                tracing::warn!(index, form_id = %entry.payload.form_id, error = %e, "submission rejected");
                rejected.push(RejectedSubmission {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        accepted = accepted.len(),
        rejected = rejected.len(),
        "processed submission push"
    );

    Ok(IntakeResponse { accepted, rejected })
}
