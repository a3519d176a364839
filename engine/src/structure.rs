//! Form structure - the display model of a dynamic form.
//!
//! Sections and their fields, as assembled from the remote definition
//! tables. The structure is cached locally so a form can still be
//! rendered and filled out while offline; the server also uses these
//! types as its GET-form response model.

use crate::delta::FieldOption;
use crate::storage::{load_json, LocalStore, OFFLINE_FORM_KEY};
use crate::{FieldId, FormId, SectionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One renderable form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormField {
    pub id: FieldId,
    pub label: String,
    pub name: String,
    pub placeholder: String,
    pub required: bool,
    /// Current input value; always empty in the stored definition.
    pub value: String,
    pub options: Vec<FieldOption>,
    #[serde(rename = "type")]
    pub field_type: String,
    pub order_index: i64,
    pub section_id: SectionId,
}

/// One form section with its fields in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSection {
    pub id: SectionId,
    pub title: String,
    pub order_index: i64,
    pub form_id: FormId,
    pub fields: Vec<FormField>,
}

/// A complete form definition ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormStructure {
    pub id: FormId,
    pub title: String,
    pub version: f64,
    pub sections: Vec<FormSection>,
}

/// Offline cache for the last loaded form structure.
pub struct FormCache {
    store: Arc<dyn LocalStore>,
}

impl FormCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The cached structure, or the empty default when absent/corrupt.
    pub fn load_offline_form(&self) -> FormStructure {
        load_json(self.store.as_ref(), OFFLINE_FORM_KEY)
    }

    /// Persist the structure; called on every change to the display model.
    pub fn set(&self, form: &FormStructure) {
        match serde_json::to_string(form) {
            Ok(json) => self.store.save(OFFLINE_FORM_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize form structure"),
        }
    }

    /// Drop the cached structure.
    pub fn clear_offline_form(&self) {
        self.store.clear(OFFLINE_FORM_KEY);
    }
}
