//! Submission intake routes.

use axum::{extract::State, routing::post, Json, Router};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{handle_intake, IntakeRequest, IntakeResponse};
use crate::AppState;

/// Create submission routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/submissions", post(intake_handler))
}

/// POST /api/submissions - Accept a client's queued submissions.
async fn intake_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(request): Json<IntakeRequest>,
) -> Result<Json<IntakeResponse>> {
    let response = handle_intake(state.gateway.as_ref(), request).await?;
    Ok(Json(response))
}
