//! CSV export of stored submissions.
//!
//! The admin selects submissions in the browsing view and downloads
//! them as one spreadsheet. Rows are flattened wide: fixed submission
//! columns first, then one column per answered question across the
//! selection, blank where a submission did not answer it.

use crate::db::{self, StoredAnswer, StoredSubmission};
use crate::error::{AppError, Result};
use famlink_engine::FormType;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::BTreeSet;

/// Body for an export: which submissions to include.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub ids: Vec<i64>,
}

/// Fixed leading columns; the two form types carry different subject
/// columns.
fn base_columns(form_type: FormType) -> &'static [&'static str] {
    match form_type {
        FormType::Fpr => &[
            "answerId",
            "formId",
            "filledOutBy",
            "scId",
            "childId",
            "createdAt",
        ],
        FormType::Fis => &["answerId", "formId", "scName", "filledOutBy", "createdAt"],
    }
}

fn base_cells(form_type: FormType, submission: &StoredSubmission) -> Vec<String> {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    let created = submission.created_at.to_rfc3339();
    match form_type {
        FormType::Fpr => vec![
            submission.answer_id.to_string(),
            submission.form_id.clone(),
            opt(&submission.filled_out_by),
            opt(&submission.sc_id),
            opt(&submission.child_id),
            created,
        ],
        FormType::Fis => vec![
            submission.answer_id.to_string(),
            submission.form_id.clone(),
            opt(&submission.sc_name),
            opt(&submission.filled_out_by),
            created,
        ],
    }
}

/// Flatten submissions and their answers into CSV text.
///
/// Question columns are the sorted union of question ids across the
/// selection, so every row has the same width.
fn export_csv(
    form_type: FormType,
    submissions: &[(StoredSubmission, Vec<StoredAnswer>)],
) -> Result<String> {
    let questions: BTreeSet<&str> = submissions
        .iter()
        .flat_map(|(_, answers)| answers.iter().map(|a| a.question_id.as_str()))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = base_columns(form_type).to_vec();
    header.extend(questions.iter().copied());
    writer
        .write_record(&header)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    for (submission, answers) in submissions {
        let mut cells = base_cells(form_type, submission);
        for question in &questions {
            let answer = answers
                .iter()
                .find(|a| a.question_id == *question)
                .and_then(|a| a.answer.clone())
                .unwrap_or_default();
            cells.push(answer);
        }
        writer
            .write_record(&cells)
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}

/// Export the selected submissions of one form type as CSV.
///
/// Ids that no longer exist are skipped rather than failing the whole
/// export; an empty selection is an error.
pub async fn handle_export(
    pool: &PgPool,
    form_type: FormType,
    request: ExportRequest,
) -> Result<String> {
    if request.ids.is_empty() {
        return Err(AppError::BadRequest("no submissions selected".into()));
    }

    let mut submissions = Vec::new();
    for id in &request.ids {
        if let Some(submission) = db::get_submission(pool, form_type, *id).await? {
            let answers = db::get_submission_answers(pool, form_type, *id).await?;
            submissions.push((submission, answers));
        }
    }

    export_csv(form_type, &submissions)
}
