//! Record browsing handlers - paginated views over stored submissions.

use crate::db::{self, StoredAnswer, StoredSubmission};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use famlink_engine::FormType;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Hard cap on page size, whatever the client asks for.
const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for listing records.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    pub form_type: FormType,
    /// Zero-based page number; defaults to 0.
    pub page: Option<u32>,
    /// Page size; defaults to the configured size.
    pub per_page: Option<u32>,
}

/// One submission in a listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub answer_id: i64,
    pub form_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_out_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sc_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredSubmission> for SubmissionSummary {
    fn from(row: StoredSubmission) -> Self {
        SubmissionSummary {
            answer_id: row.answer_id,
            form_id: row.form_id,
            filled_out_by: row.filled_out_by,
            sc_id: row.sc_id,
            child_id: row.child_id,
            sc_name: row.sc_name,
            created_at: row.created_at,
        }
    }
}

/// Response for listing records.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsResponse {
    pub records: Vec<SubmissionSummary>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// One answered question in a record detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_id: String,
    pub answer: Option<String>,
}

impl From<StoredAnswer> for AnswerEntry {
    fn from(row: StoredAnswer) -> Self {
        AnswerEntry {
            question_id: row.question_id,
            answer: row.answer,
        }
    }
}

/// Full detail of one submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetail {
    #[serde(flatten)]
    pub submission: SubmissionSummary,
    pub answers: Vec<AnswerEntry>,
}

/// Newest-first page of submissions for one form type.
pub async fn handle_list_records(
    pool: &PgPool,
    default_page_size: u32,
    query: RecordsQuery,
) -> Result<RecordsResponse> {
    let per_page = query
        .per_page
        .unwrap_or(default_page_size)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(0);
    let offset = i64::from(page) * i64::from(per_page);

    let rows =
        db::list_submissions(pool, query.form_type, i64::from(per_page), offset).await?;
    let total = db::count_submissions(pool, query.form_type).await?;

    Ok(RecordsResponse {
        records: rows.into_iter().map(SubmissionSummary::from).collect(),
        total,
        page,
        per_page,
    })
}

/// One submission with all its answers.
pub async fn handle_get_record(
    pool: &PgPool,
    form_type: FormType,
    answer_id: i64,
) -> Result<RecordDetail> {
    let submission = db::get_submission(pool, form_type, answer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("submission {answer_id} not found")))?;
    let answers = db::get_submission_answers(pool, form_type, answer_id).await?;

    Ok(RecordDetail {
        submission: submission.into(),
        answers: answers.into_iter().map(AnswerEntry::from).collect(),
    })
}

/// Delete a submission and its answers.
pub async fn handle_delete_record(
    pool: &PgPool,
    form_type: FormType,
    answer_id: i64,
) -> Result<()> {
    if !db::delete_submission(pool, form_type, answer_id).await? {
        return Err(AppError::NotFound(format!(
            "submission {answer_id} not found"
        )));
    }
    Ok(())
}
