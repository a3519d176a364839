//! Edits handler - replays a client's pending form-edit deltas.
//!
//! The client sends the delta lists accumulated during an editing
//! session. They are replayed through the delta tracker; deltas whose
//! remote write fails come back in the response so the client can
//! retry them without rebuilding the session.

use crate::error::Result;
use famlink_engine::{DeltaTracker, FieldDelta, RemoteGateway, SectionDelta};
use serde::{Deserialize, Serialize};

/// Request body for confirming form edits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditsRequest {
    pub fields: Vec<FieldDelta>,
    pub sections: Vec<SectionDelta>,
}

/// Response for confirming form edits.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditsResponse {
    /// True when every delta was applied.
    pub ok: bool,
    /// Field deltas that failed and should be retried.
    pub retained_fields: Vec<FieldDelta>,
    /// Section deltas that failed and should be retried.
    pub retained_sections: Vec<SectionDelta>,
}

/// Replay the submitted deltas against the database.
///
/// Section adds missing an `orderindex` get one computed from the
/// form's current maximum, so clients that went offline mid-edit do
/// not have to know the remote state.
pub async fn handle_edits(
    gateway: &dyn RemoteGateway,
    form_id: &str,
    request: EditsRequest,
) -> Result<EditsResponse> {
    let mut tracker = DeltaTracker::from_parts(request.fields, Vec::new());
    for delta in request.sections {
        tracker
            .record_section_change(gateway, delta.kind, delta.section_id, delta.patch, form_id)
            .await?;
    }

    let ok = tracker.confirm_edits(gateway).await;
    if !ok {
        tracing::warn!(
            form_id,
            fields = tracker.fields().len(),
            sections = tracker.sections().len(),
            "edit confirm left unapplied deltas"
        );
    }

    Ok(EditsResponse {
        ok,
        retained_fields: tracker.fields().to_vec(),
        retained_sections: tracker.sections().to_vec(),
    })
}
