//! Admin audit log persistence.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// One audit log entry.
#[derive(Debug)]
pub struct AuditEntry {
    pub id: i64,
    pub actor: String,
    pub action: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AuditEntry {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AuditEntry {
            id: row.try_get("id")?,
            actor: row.try_get("actor")?,
            action: row.try_get("action")?,
            detail: row.try_get("detail")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Append an entry. Audit failures are logged but never fail the
/// admin action they describe.
pub async fn record_action(pool: &PgPool, actor: &str, action: &str, detail: &str) {
    let result = sqlx::query("INSERT INTO audit_log (actor, action, detail) VALUES ($1, $2, $3)")
        .bind(actor)
        .bind(action)
        .bind(detail)
        .execute(pool)
        .await;

    if let Err(e) = result {
        tracing::error!(action, error = %e, "failed to record audit entry");
    }
}

/// Newest-first audit entries, capped at `limit`.
pub async fn recent_actions(pool: &PgPool, limit: i64) -> Result<Vec<AuditEntry>, sqlx::Error> {
    sqlx::query_as::<_, AuditEntry>(
        r#"
        SELECT id, actor, action, detail, created_at
        FROM audit_log
        ORDER BY id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
