//! Delta tracker for form editing.
//!
//! While an admin edits a form, every structural change (add, update or
//! delete of a section or field) is recorded as a typed change record,
//! decoupled from the live display model. The lists are replayed against
//! the remote store when the editor confirms, or discarded on cancel.
//!
//! Replay is not transactional: a failure mid-replay leaves the already
//! applied changes in place. Unlike a plain clear-on-finish, deltas that
//! fail to apply are retained for a later retry, mirroring the
//! submission queue's contract.

use crate::error::{Error, Result};
use crate::gateway::{
    Filter, OrderBy, RemoteGateway, Select, FORM_FIELDS_TABLE, FORM_SECTIONS_TABLE,
};
use crate::{FieldId, FormId, SectionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a delta does to its target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Update,
    Delete,
}

/// One selectable option on a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// Partial attributes of a form field.
///
/// Serialized keys are the remote column names; unset attributes are
/// omitted so a patch only touches what changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(rename = "orderindex", skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(rename = "sectionid", skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
    #[serde(rename = "formid", skip_serializing_if = "Option::is_none")]
    pub form_id: Option<FormId>,
}

/// Partial attributes of a form section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "formid", skip_serializing_if = "Option::is_none")]
    pub form_id: Option<FormId>,
    #[serde(rename = "orderindex", skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

/// A recorded pending change to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDelta {
    pub kind: ChangeKind,
    pub field_id: FieldId,
    pub patch: FieldPatch,
}

/// A recorded pending change to a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDelta {
    pub kind: ChangeKind,
    pub section_id: SectionId,
    pub patch: SectionPatch,
}

/// Append-only lists of pending edits for one editing session.
///
/// Field deltas and section deltas are independent lists; on confirm,
/// field deltas replay before section deltas, each list in append order.
#[derive(Debug, Default)]
pub struct DeltaTracker {
    fields: Vec<FieldDelta>,
    sections: Vec<SectionDelta>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from serialized delta lists (e.g. a request body).
    pub fn from_parts(fields: Vec<FieldDelta>, sections: Vec<SectionDelta>) -> Self {
        Self { fields, sections }
    }

    /// Record a pending field change.
    pub fn record_field_change(
        &mut self,
        kind: ChangeKind,
        field_id: impl Into<FieldId>,
        patch: FieldPatch,
    ) {
        self.fields.push(FieldDelta {
            kind,
            field_id: field_id.into(),
            patch,
        });
    }

    /// Record a pending section change.
    ///
    /// For `Add`, the section's `orderindex` is computed by reading the
    /// owning form's current maximum from the remote store and
    /// incrementing it (0 when the form has no sections yet). This is a
    /// read-before-write and assumes a single editing session per form;
    /// concurrent editors are out of scope.
    pub async fn record_section_change(
        &mut self,
        gateway: &dyn RemoteGateway,
        kind: ChangeKind,
        section_id: impl Into<SectionId>,
        mut patch: SectionPatch,
        form_id: &str,
    ) -> Result<()> {
        if kind == ChangeKind::Add {
            patch.form_id = Some(form_id.to_string());
            if patch.order_index.is_none() {
                patch.order_index = Some(next_order_index(gateway, form_id).await?);
            }
        }
        self.sections.push(SectionDelta {
            kind,
            section_id: section_id.into(),
            patch,
        });
        Ok(())
    }

    /// Pending field deltas, in append order.
    pub fn fields(&self) -> &[FieldDelta] {
        &self.fields
    }

    /// Pending section deltas, in append order.
    pub fn sections(&self) -> &[SectionDelta] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.sections.is_empty()
    }

    /// Replay every pending delta against the remote store.
    ///
    /// Field deltas replay first, then section deltas, each list in
    /// order. Applied deltas are cleared; deltas whose remote call fails
    /// are logged and retained (original relative order) so a later
    /// confirm can retry them. Already-applied changes are never rolled
    /// back. Returns `true` only if nothing was retained.
    pub async fn confirm_edits(&mut self, gateway: &dyn RemoteGateway) -> bool {
        if self.is_empty() {
            return true;
        }

        let mut retained_fields = Vec::new();
        for delta in std::mem::take(&mut self.fields) {
            if let Err(e) = apply_field_delta(gateway, &delta).await {
                tracing::warn!(field_id = %delta.field_id, error = %e, "field delta failed, retained for retry");
                retained_fields.push(delta);
            }
        }

        let mut retained_sections = Vec::new();
        for delta in std::mem::take(&mut self.sections) {
            if let Err(e) = apply_section_delta(gateway, &delta).await {
                tracing::warn!(section_id = %delta.section_id, error = %e, "section delta failed, retained for retry");
                retained_sections.push(delta);
            }
        }

        let ok = retained_fields.is_empty() && retained_sections.is_empty();
        if !ok {
            tracing::warn!(
                fields = retained_fields.len(),
                sections = retained_sections.len(),
                "confirm finished with unapplied deltas"
            );
        }
        self.fields = retained_fields;
        self.sections = retained_sections;
        ok
    }

    /// Drop all pending deltas (the editor cancelled).
    pub fn discard_edits(&mut self) {
        self.fields.clear();
        self.sections.clear();
    }
}

/// Next `orderindex` for a new section of `form_id`.
async fn next_order_index(gateway: &dyn RemoteGateway, form_id: &str) -> Result<i64> {
    let rows = gateway
        .select(
            FORM_SECTIONS_TABLE,
            Select::new()
                .filter(Filter::new().eq("formid", form_id))
                .order(OrderBy::desc("orderindex"))
                .range(0, 0),
        )
        .await?;

    Ok(rows
        .first()
        .and_then(|row| row.get("orderindex"))
        .and_then(Value::as_i64)
        .map(|max| max + 1)
        .unwrap_or(0))
}

async fn apply_field_delta(gateway: &dyn RemoteGateway, delta: &FieldDelta) -> Result<()> {
    let patch = to_row(&delta.patch)?;
    match delta.kind {
        ChangeKind::Add => {
            gateway.insert(FORM_FIELDS_TABLE, vec![patch]).await?;
        }
        ChangeKind::Update => {
            gateway
                .update(
                    FORM_FIELDS_TABLE,
                    patch,
                    Filter::new().eq("id", delta.field_id.as_str()),
                )
                .await?;
        }
        ChangeKind::Delete => {
            gateway
                .delete(
                    FORM_FIELDS_TABLE,
                    Filter::new().eq("id", delta.field_id.as_str()),
                )
                .await?;
        }
    }
    Ok(())
}

async fn apply_section_delta(gateway: &dyn RemoteGateway, delta: &SectionDelta) -> Result<()> {
    let patch = to_row(&delta.patch)?;
    match delta.kind {
        ChangeKind::Add => {
            gateway.insert(FORM_SECTIONS_TABLE, vec![patch]).await?;
        }
        ChangeKind::Update => {
            gateway
                .update(
                    FORM_SECTIONS_TABLE,
                    patch,
                    Filter::new().eq("id", delta.section_id.as_str()),
                )
                .await?;
        }
        ChangeKind::Delete => {
            gateway
                .delete(
                    FORM_SECTIONS_TABLE,
                    Filter::new().eq("id", delta.section_id.as_str()),
                )
                .await?;
        }
    }
    Ok(())
}

fn to_row<T: Serialize>(patch: &T) -> Result<Value> {
    serde_json::to_value(patch).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, MockGateway};
    use serde_json::json;

    fn health_section() -> SectionPatch {
        SectionPatch {
            title: Some("Health".into()),
            ..Default::default()
        }
    }

    #[test]
    fn patch_serializes_to_column_names() {
        let patch = FieldPatch {
            label: Some("First name".into()),
            field_type: Some("text".into()),
            order_index: Some(3),
            section_id: Some("s1".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "label": "First name",
                "type": "text",
                "orderindex": 3,
                "sectionid": "s1",
            })
        );
    }

    #[tokio::test]
    async fn add_section_computes_next_order_index() {
        let gateway = MockGateway::new();
        gateway.set_select_rows(vec![json!({"id": "s2", "orderindex": 2})]);

        let mut tracker = DeltaTracker::new();
        tracker
            .record_section_change(&gateway, ChangeKind::Add, "", health_section(), "F1")
            .await
            .unwrap();

        let delta = &tracker.sections()[0];
        assert_eq!(delta.patch.order_index, Some(3));
        assert_eq!(delta.patch.form_id.as_deref(), Some("F1"));
        assert_eq!(delta.patch.title.as_deref(), Some("Health"));
    }

    #[tokio::test]
    async fn add_section_falls_back_to_zero() {
        let gateway = MockGateway::new();

        let mut tracker = DeltaTracker::new();
        tracker
            .record_section_change(&gateway, ChangeKind::Add, "", health_section(), "F1")
            .await
            .unwrap();

        assert_eq!(tracker.sections()[0].patch.order_index, Some(0));
    }

    #[tokio::test]
    async fn update_and_delete_do_not_touch_the_gateway() {
        let gateway = MockGateway::new();

        let mut tracker = DeltaTracker::new();
        tracker
            .record_section_change(
                &gateway,
                ChangeKind::Delete,
                "s1",
                SectionPatch::default(),
                "F1",
            )
            .await
            .unwrap();

        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn confirm_replays_fields_before_sections() {
        let gateway = MockGateway::new();

        let mut tracker = DeltaTracker::new();
        tracker
            .record_section_change(
                &gateway,
                ChangeKind::Update,
                "s1",
                SectionPatch {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
                "F1",
            )
            .await
            .unwrap();
        tracker.record_field_change(
            ChangeKind::Add,
            "",
            FieldPatch {
                label: Some("Age".into()),
                section_id: Some("s1".into()),
                ..Default::default()
            },
        );

        assert!(tracker.confirm_edits(&gateway).await);
        assert!(tracker.is_empty());

        let calls = gateway.calls();
        assert!(matches!(&calls[0], Call::Insert { table, .. } if table == FORM_FIELDS_TABLE));
        assert!(matches!(&calls[1], Call::Update { table, .. } if table == FORM_SECTIONS_TABLE));
    }

    #[tokio::test]
    async fn partial_failure_retains_unapplied_deltas() {
        let gateway = MockGateway::new();
        gateway.fail_table(FORM_SECTIONS_TABLE);

        let mut tracker = DeltaTracker::new();
        tracker.record_field_change(
            ChangeKind::Update,
            "f1",
            FieldPatch {
                required: Some(true),
                ..Default::default()
            },
        );
        tracker.record_field_change(ChangeKind::Delete, "f2", FieldPatch::default());
        tracker
            .record_section_change(
                &gateway,
                ChangeKind::Delete,
                "s1",
                SectionPatch::default(),
                "F1",
            )
            .await
            .unwrap();

        assert!(!tracker.confirm_edits(&gateway).await);

        // Field deltas applied and cleared; the failed section delta is kept.
        assert!(tracker.fields().is_empty());
        assert_eq!(tracker.sections().len(), 1);
        assert_eq!(tracker.sections()[0].section_id, "s1");

        // A retry with the remote healthy drains the rest.
        gateway.unfail_table(FORM_SECTIONS_TABLE);
        assert!(tracker.confirm_edits(&gateway).await);
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn confirm_on_empty_tracker_is_a_noop() {
        let gateway = MockGateway::new();
        let mut tracker = DeltaTracker::new();
        assert!(tracker.confirm_edits(&gateway).await);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn discard_drops_everything() {
        let gateway = MockGateway::new();
        let mut tracker = DeltaTracker::new();
        tracker.record_field_change(ChangeKind::Delete, "f1", FieldPatch::default());
        tracker
            .record_section_change(
                &gateway,
                ChangeKind::Update,
                "s1",
                SectionPatch::default(),
                "F1",
            )
            .await
            .unwrap();

        tracker.discard_edits();
        assert!(tracker.is_empty());
    }

    #[test]
    fn delta_wire_shape() {
        let delta = FieldDelta {
            kind: ChangeKind::Add,
            field_id: String::new(),
            patch: FieldPatch {
                label: Some("Name".into()),
                ..Default::default()
            },
        };

        let json = serde_json::to_string(&delta).unwrap();
        assert!(json.contains("\"kind\":\"add\""));
        assert!(json.contains("\"fieldId\":\"\""));

        let parsed: FieldDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(delta, parsed);
    }
}
