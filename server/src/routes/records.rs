//! Stored submission browsing routes.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use famlink_engine::FormType;

use crate::auth::AuthUser;
use crate::db;
use crate::error::Result;
use crate::handlers::{
    handle_delete_record, handle_export, handle_get_record, handle_list_records, ExportRequest,
    RecordDetail, RecordsQuery, RecordsResponse,
};
use crate::AppState;

/// Create record routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/records", get(list_handler))
        .route("/api/records/{form_type}/export", post(export_handler))
        .route(
            "/api/records/{form_type}/{answer_id}",
            get(detail_handler).delete(delete_handler),
        )
}

/// GET /api/records?formType=FPR&page=0 - Paginated submissions.
async fn list_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<RecordsResponse>> {
    let response =
        handle_list_records(&state.pool, state.config.records_page_size, query).await?;
    Ok(Json(response))
}

/// GET /api/records/{form_type}/{answer_id} - One submission with answers.
async fn detail_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((form_type, answer_id)): Path<(FormType, i64)>,
) -> Result<Json<RecordDetail>> {
    let detail = handle_get_record(&state.pool, form_type, answer_id).await?;
    Ok(Json(detail))
}

/// POST /api/records/{form_type}/export - Selected submissions as CSV.
async fn export_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_type): Path<FormType>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse> {
    let count = request.ids.len();
    let csv = handle_export(&state.pool, form_type, request).await?;
    let detail = format!(
        "exported {count} submission(s) from {}",
        form_type.parent_table()
    );
    db::record_action(&state.pool, &auth.token, "record.export", &detail).await;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"submissions.csv\"",
            ),
        ],
        csv,
    ))
}

/// DELETE /api/records/{form_type}/{answer_id} - Remove a submission.
async fn delete_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((form_type, answer_id)): Path<(FormType, i64)>,
) -> Result<StatusCode> {
    handle_delete_record(&state.pool, form_type, answer_id).await?;
    let detail = format!(
        "deleted submission {answer_id} from {}",
        form_type.parent_table()
    );
    db::record_action(&state.pool, &auth.token, "record.delete", &detail).await;
    Ok(StatusCode::NO_CONTENT)
}
