//! Account management handlers for the admin panel.
//!
//! Password and credential changes are not handled here; they belong
//! to the external identity provider. This side only manages the role
//! attached to each account and the account's stored submissions.

use crate::db::{self, User, UserRole};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Body for creating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    /// Defaults to `Worker` when omitted.
    pub role: Option<UserRole>,
}

/// One account as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// All accounts, oldest first.
pub async fn handle_list_users(pool: &PgPool) -> Result<Vec<UserResponse>> {
    let users = db::list_users(pool).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Create an account. Usernames are unique.
pub async fn handle_create_user(
    pool: &PgPool,
    request: CreateUserRequest,
) -> Result<UserResponse> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username must not be empty".into()));
    }
    if db::get_user_by_username(pool, username).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "username '{username}' is already taken"
        )));
    }

    let role = request.role.unwrap_or(UserRole::Worker);
    let user = db::create_user(pool, username, role).await?;
    Ok(user.into())
}

/// Flip an account between `Admin` and `Worker`.
pub async fn handle_toggle_role(pool: &PgPool, id: &str) -> Result<UserResponse> {
    let user = db::toggle_user_role(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;
    Ok(user.into())
}

/// Remove an account together with the submissions it filed.
pub async fn handle_delete_user(pool: &PgPool, id: &str) -> Result<UserResponse> {
    let user = db::delete_user(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_role_is_optional() {
        let parsed: CreateUserRequest =
            serde_json::from_str(r#"{"username": "jane"}"#).unwrap();
        assert_eq!(parsed.username, "jane");
        assert_eq!(parsed.role, None);

        let parsed: CreateUserRequest =
            serde_json::from_str(r#"{"username": "jane", "role": "Admin"}"#).unwrap();
        assert_eq!(parsed.role, Some(UserRole::Admin));
    }

    #[test]
    fn user_response_wire_shape() {
        let response = UserResponse {
            id: "u1".into(),
            username: "jane".into(),
            role: UserRole::Worker,
            created_at: "2026-08-27T10:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"username\":\"jane\""));
        assert!(json.contains("\"role\":\"Worker\""));
        assert!(json.contains("\"createdAt\""));
    }

    #[tokio::test]
    async fn empty_username_is_rejected_before_touching_the_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();

        let err = handle_create_user(
            &pool,
            CreateUserRequest {
                username: "   ".into(),
                role: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
