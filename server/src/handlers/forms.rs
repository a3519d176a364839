//! Form definition handlers - CRUD over forms and assembly of the
//! full renderable structure.

use crate::error::{AppError, Result};
use famlink_engine::{
    FieldOption, Filter, FormField, FormSection, FormStructure, OrderBy, RemoteGateway, Select,
    FORMS_TABLE, FORM_FIELDS_TABLE, FORM_SECTIONS_TABLE,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Request body for creating a form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    pub title: String,
    /// Defaults to 1.0 when omitted.
    pub version: Option<f64>,
}

/// Request body for renaming/reversioning a form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormRequest {
    pub title: Option<String>,
    pub version: Option<f64>,
}

/// Create a new form definition; returns the stored row.
pub async fn handle_create_form(
    gateway: &dyn RemoteGateway,
    request: CreateFormRequest,
) -> Result<Value> {
    if request.title.trim().is_empty() {
        return Err(AppError::BadRequest("form title must not be empty".into()));
    }

    let row = json!({
        "id": Uuid::new_v4().to_string(),
        "title": request.title,
        "version": request.version.unwrap_or(1.0),
    });

    let mut inserted = gateway.insert(FORMS_TABLE, vec![row]).await?;
    inserted
        .pop()
        .ok_or_else(|| AppError::Internal("insert returned no row".into()))
}

/// All form rows, oldest first.
pub async fn handle_list_forms(gateway: &dyn RemoteGateway) -> Result<Vec<Value>> {
    Ok(gateway
        .select(FORMS_TABLE, Select::new().order(OrderBy::asc("createdat")))
        .await?)
}

/// Assemble the complete structure of one form: its row plus sections
/// and fields in display order.
pub async fn handle_get_form(gateway: &dyn RemoteGateway, form_id: &str) -> Result<FormStructure> {
    let form_rows = gateway
        .select(
            FORMS_TABLE,
            Select::new().filter(Filter::new().eq("id", form_id)),
        )
        .await?;
    let form = form_rows
        .first()
        .ok_or_else(|| AppError::NotFound(format!("form '{form_id}' not found")))?;

    let section_rows = gateway
        .select(
            FORM_SECTIONS_TABLE,
            Select::new()
                .filter(Filter::new().eq("formid", form_id))
                .order(OrderBy::asc("orderindex")),
        )
        .await?;

    let mut sections = Vec::with_capacity(section_rows.len());
    for row in &section_rows {
        let mut section = section_from_row(row);
        let field_rows = gateway
            .select(
                FORM_FIELDS_TABLE,
                Select::new()
                    .filter(Filter::new().eq("sectionid", section.id.as_str()))
                    .order(OrderBy::asc("orderindex")),
            )
            .await?;
        section.fields = field_rows.iter().map(field_from_row).collect();
        sections.push(section);
    }

    Ok(FormStructure {
        id: str_column(form, "id"),
        title: str_column(form, "title"),
        version: form.get("version").and_then(Value::as_f64).unwrap_or(1.0),
        sections,
    })
}

/// Update a form's title and/or version; returns the stored row.
pub async fn handle_update_form(
    gateway: &dyn RemoteGateway,
    form_id: &str,
    request: UpdateFormRequest,
) -> Result<Value> {
    let mut patch = serde_json::Map::new();
    if let Some(title) = request.title {
        if title.trim().is_empty() {
            return Err(AppError::BadRequest("form title must not be empty".into()));
        }
        patch.insert("title".into(), Value::String(title));
    }
    if let Some(version) = request.version {
        patch.insert("version".into(), json!(version));
    }
    if patch.is_empty() {
        return Err(AppError::BadRequest("nothing to update".into()));
    }

    let mut updated = gateway
        .update(
            FORMS_TABLE,
            Value::Object(patch),
            Filter::new().eq("id", form_id),
        )
        .await?;
    updated
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("form '{form_id}' not found")))
}

/// Delete a form definition; sections and fields cascade.
pub async fn handle_delete_form(gateway: &dyn RemoteGateway, form_id: &str) -> Result<()> {
    let existing = gateway
        .select(
            FORMS_TABLE,
            Select::new().filter(Filter::new().eq("id", form_id)),
        )
        .await?;
    if existing.is_empty() {
        return Err(AppError::NotFound(format!("form '{form_id}' not found")));
    }

    gateway
        .delete(FORMS_TABLE, Filter::new().eq("id", form_id))
        .await?;
    Ok(())
}

fn str_column(row: &Value, column: &str) -> String {
    row.get(column)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn i64_column(row: &Value, column: &str) -> i64 {
    row.get(column).and_then(Value::as_i64).unwrap_or(0)
}

fn section_from_row(row: &Value) -> FormSection {
    FormSection {
        id: str_column(row, "id"),
        title: str_column(row, "title"),
        order_index: i64_column(row, "orderindex"),
        form_id: str_column(row, "formid"),
        fields: Vec::new(),
    }
}

fn field_from_row(row: &Value) -> FormField {
    let options: Vec<FieldOption> = row
        .get("options")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    FormField {
        id: str_column(row, "id"),
        label: str_column(row, "label"),
        name: str_column(row, "name"),
        placeholder: str_column(row, "placeholder"),
        required: row.get("required").and_then(Value::as_bool).unwrap_or(false),
        value: String::new(),
        options,
        field_type: str_column(row, "type"),
        order_index: i64_column(row, "orderindex"),
        section_id: str_column(row, "sectionid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_row_conversion() {
        let row = json!({
            "id": "f1",
            "label": "Region",
            "name": "region",
            "placeholder": "",
            "required": true,
            "options": [{"label": "North", "value": "north"}],
            "type": "select",
            "orderindex": 2,
            "sectionid": "s1",
        });

        let field = field_from_row(&row);
        assert_eq!(field.id, "f1");
        assert!(field.required);
        assert_eq!(field.field_type, "select");
        assert_eq!(field.order_index, 2);
        assert_eq!(field.options.len(), 1);
        assert_eq!(field.options[0].value, "north");
        assert!(field.value.is_empty());
    }

    #[test]
    fn missing_columns_fall_back_to_defaults() {
        let row = json!({"id": "s1"});
        let section = section_from_row(&row);
        assert_eq!(section.id, "s1");
        assert_eq!(section.order_index, 0);
        assert!(section.title.is_empty());
    }
}
