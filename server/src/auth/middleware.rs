//! Authentication middleware.
//!
//! Admin requests carry a shared-secret bearer token. When no
//! AUTH_SECRET is configured the server runs open, which is the
//! expected mode for local development.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::AppState;

/// Authenticated admin extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The bearer token; recorded as the actor in the audit log.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let token = header.trim_start_matches("Bearer ").to_string();
                if token.is_empty() {
                    return Err(AppError::Unauthorized);
                }

                if let Some(ref secret) = state.config.auth_secret {
                    if token != *secret {
                        tracing::debug!("rejected request with wrong bearer token");
                        return Err(AppError::Unauthorized);
                    }
                }

                Ok(AuthUser { token })
            }
            Some(_) => Err(AppError::Unauthorized),
            None => {
                if state.config.auth_secret.is_none() {
                    // No auth configured, allow anonymous access
                    Ok(AuthUser {
                        token: "anonymous".to_string(),
                    })
                } else {
                    Err(AppError::Unauthorized)
                }
            }
        }
    }
}
