//! Database operations for browsing stored submissions.
//!
//! Submission writes go through the engine's gateway; the admin
//! browsing views need pagination and joins the gateway contract does
//! not carry, so they query the answer tables directly.

use chrono::{DateTime, Utc};
use famlink_engine::FormType;
use sqlx::{PgPool, Row};

/// A parent submission row from either answers table.
///
/// The two form types carry different subject columns; the ones that do
/// not apply are `None`.
#[derive(Debug)]
pub struct StoredSubmission {
    pub answer_id: i64,
    pub form_id: String,
    pub filled_out_by: Option<String>,
    pub sc_id: Option<String>,
    pub child_id: Option<String>,
    pub sc_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredSubmission {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredSubmission {
            answer_id: row.try_get("answer_id")?,
            form_id: row.try_get("form_id")?,
            filled_out_by: row.try_get("filled_out_by")?,
            sc_id: row.try_get("sc_id")?,
            child_id: row.try_get("child_id")?,
            sc_name: row.try_get("sc_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// One answered question belonging to a submission.
#[derive(Debug)]
pub struct StoredAnswer {
    pub question_id: String,
    pub answer: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredAnswer {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredAnswer {
            question_id: row.try_get("question_id")?,
            answer: row.try_get("answer")?,
        })
    }
}

fn parent_query(form_type: FormType) -> &'static str {
    match form_type {
        FormType::Fpr => {
            r#"
            SELECT answer_id, form_id, filled_out_by, sc_id, child_id,
                   NULL AS sc_name, created_at
            FROM fpr_answers
            ORDER BY created_at DESC, answer_id DESC
            LIMIT $1 OFFSET $2
            "#
        }
        FormType::Fis => {
            r#"
            SELECT answer_id, form_id, filled_out_by, NULL AS sc_id,
                   NULL AS child_id, sc_name, created_at
            FROM fis_answers
            ORDER BY created_at DESC, answer_id DESC
            LIMIT $1 OFFSET $2
            "#
        }
    }
}

fn detail_query(form_type: FormType) -> &'static str {
    match form_type {
        FormType::Fpr => {
            r#"
            SELECT answer_id, form_id, filled_out_by, sc_id, child_id,
                   NULL AS sc_name, created_at
            FROM fpr_answers
            WHERE answer_id = $1
            "#
        }
        FormType::Fis => {
            r#"
            SELECT answer_id, form_id, filled_out_by, NULL AS sc_id,
                   NULL AS child_id, sc_name, created_at
            FROM fis_answers
            WHERE answer_id = $1
            "#
        }
    }
}

/// Newest-first page of submissions for one form type.
pub async fn list_submissions(
    pool: &PgPool,
    form_type: FormType,
    limit: i64,
    offset: i64,
) -> Result<Vec<StoredSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StoredSubmission>(parent_query(form_type))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Total submission count for one form type.
pub async fn count_submissions(pool: &PgPool, form_type: FormType) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {}", form_type.parent_table());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}

/// One submission's parent row, if it exists.
pub async fn get_submission(
    pool: &PgPool,
    form_type: FormType,
    answer_id: i64,
) -> Result<Option<StoredSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StoredSubmission>(detail_query(form_type))
        .bind(answer_id)
        .fetch_optional(pool)
        .await
}

/// All answered questions for a submission, in insertion order.
pub async fn get_submission_answers(
    pool: &PgPool,
    form_type: FormType,
    answer_id: i64,
) -> Result<Vec<StoredAnswer>, sqlx::Error> {
    let sql = format!(
        "SELECT question_id, answer FROM {} WHERE answer_id = $1 ORDER BY id",
        form_type.list_table()
    );
    sqlx::query_as::<_, StoredAnswer>(&sql)
        .bind(answer_id)
        .fetch_all(pool)
        .await
}

/// Delete a submission and its answers. Returns false when the parent
/// row did not exist.
pub async fn delete_submission(
    pool: &PgPool,
    form_type: FormType,
    answer_id: i64,
) -> Result<bool, sqlx::Error> {
    // Answer rows cascade from the parent.
    let sql = format!(
        "DELETE FROM {} WHERE answer_id = $1",
        form_type.parent_table()
    );
    let result = sqlx::query(&sql).bind(answer_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
