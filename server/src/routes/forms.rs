//! Form definition routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use famlink_engine::FormStructure;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::db;
use crate::error::Result;
use crate::handlers::{
    handle_create_form, handle_delete_form, handle_edits, handle_get_form, handle_list_forms,
    handle_update_form, CreateFormRequest, EditsRequest, EditsResponse, UpdateFormRequest,
};
use crate::AppState;

/// Create form routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/forms", get(list_handler).post(create_handler))
        .route(
            "/api/forms/{id}",
            get(get_handler)
                .put(update_handler)
                .delete(delete_handler),
        )
        .route("/api/forms/{id}/edits", post(edits_handler))
}

/// POST /api/forms - Create a form definition.
async fn create_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let form = handle_create_form(state.gateway.as_ref(), request).await?;
    let detail = format!(
        "created form {}",
        form.get("id").and_then(Value::as_str).unwrap_or("?")
    );
    db::record_action(&state.pool, &auth.token, "form.create", &detail).await;
    Ok((StatusCode::CREATED, Json(form)))
}

/// GET /api/forms - List all form definitions.
async fn list_handler(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<Vec<Value>>> {
    let forms = handle_list_forms(state.gateway.as_ref()).await?;
    Ok(Json(forms))
}

/// GET /api/forms/{id} - The full renderable form structure.
async fn get_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(form_id): Path<String>,
) -> Result<Json<FormStructure>> {
    let structure = handle_get_form(state.gateway.as_ref(), &form_id).await?;
    Ok(Json(structure))
}

/// PUT /api/forms/{id} - Update title/version.
async fn update_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<String>,
    Json(request): Json<UpdateFormRequest>,
) -> Result<Json<Value>> {
    let form = handle_update_form(state.gateway.as_ref(), &form_id, request).await?;
    let detail = format!("updated form {form_id}");
    db::record_action(&state.pool, &auth.token, "form.update", &detail).await;
    Ok(Json(form))
}

/// DELETE /api/forms/{id} - Delete a form and its structure.
async fn delete_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<String>,
) -> Result<StatusCode> {
    handle_delete_form(state.gateway.as_ref(), &form_id).await?;
    let detail = format!("deleted form {form_id}");
    db::record_action(&state.pool, &auth.token, "form.delete", &detail).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/forms/{id}/edits - Replay pending edit deltas.
async fn edits_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<String>,
    Json(request): Json<EditsRequest>,
) -> Result<Json<EditsResponse>> {
    let field_count = request.fields.len();
    let section_count = request.sections.len();
    let response = handle_edits(state.gateway.as_ref(), &form_id, request).await?;
    let detail = format!(
        "applied edits to form {form_id} ({field_count} field, {section_count} section deltas, ok={})",
        response.ok
    );
    db::record_action(&state.pool, &auth.token, "form.edit", &detail).await;
    Ok(Json(response))
}
