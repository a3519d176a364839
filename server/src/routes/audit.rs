//! Admin audit log routes.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db;
use crate::error::Result;
use crate::AppState;

/// Default number of audit entries returned.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum number of audit entries returned.
const MAX_LIMIT: i64 = 500;

/// Query parameters for the audit listing.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// One audit entry as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: i64,
    pub actor: String,
    pub action: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

/// Create audit routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/audit", get(list_handler))
}

/// GET /api/audit - Newest-first admin actions.
async fn list_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntryResponse>>> {
    let limit = query
        .limit
        .map(|l| l.clamp(1, MAX_LIMIT))
        .unwrap_or(DEFAULT_LIMIT);

    let entries = db::recent_actions(&state.pool, limit).await?;
    let response = entries
        .into_iter()
        .map(|e| AuditEntryResponse {
            id: e.id,
            actor: e.actor,
            action: e.action,
            detail: e.detail,
            created_at: e.created_at,
        })
        .collect();
    Ok(Json(response))
}
