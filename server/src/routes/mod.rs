//! HTTP route definitions.

mod audit;
mod forms;
mod health;
mod records;
mod submissions;
mod users;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(forms::routes())
        .merge(submissions::routes())
        .merge(records::routes())
        .merge(audit::routes())
        .merge(users::routes())
}
