//! Account management routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::auth::AuthUser;
use crate::db;
use crate::error::Result;
use crate::handlers::{
    handle_create_user, handle_delete_user, handle_list_users, handle_toggle_role,
    CreateUserRequest, UserResponse,
};
use crate::AppState;

/// Create user management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_handler).post(create_handler))
        .route("/api/users/{id}/role", put(toggle_role_handler))
        .route("/api/users/{id}", axum::routing::delete(delete_handler))
}

/// GET /api/users - All accounts.
async fn list_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>> {
    Ok(Json(handle_list_users(&state.pool).await?))
}

/// POST /api/users - Create an account.
async fn create_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = handle_create_user(&state.pool, request).await?;
    let detail = format!("created user '{}' as {}", user.username, user.role.as_str());
    db::record_action(&state.pool, &auth.token, "user.create", &detail).await;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id}/role - Flip an account between Admin and Worker.
async fn toggle_role_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = handle_toggle_role(&state.pool, &id).await?;
    let detail = format!("set user '{}' to {}", user.username, user.role.as_str());
    db::record_action(&state.pool, &auth.token, "user.role", &detail).await;
    Ok(Json(user))
}

/// DELETE /api/users/{id} - Remove an account and its submissions.
async fn delete_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let user = handle_delete_user(&state.pool, &id).await?;
    let detail = format!("deleted user '{}' and their submissions", user.username);
    db::record_action(&state.pool, &auth.token, "user.delete", &detail).await;
    Ok(StatusCode::NO_CONTENT)
}
