//! Remote persistence gateway - the hosted database contract.
//!
//! The engine consumes table-scoped create/read/update/delete with
//! filtering, ordering and row ranges. Every call is assumed atomic on
//! its own but nothing is transactional across calls; the sync engine
//! and delta tracker are written around that limitation.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Form definitions.
pub const FORMS_TABLE: &str = "forms";
/// Sections belonging to a form, ordered by `orderindex`.
pub const FORM_SECTIONS_TABLE: &str = "form_sections";
/// Fields belonging to a section, ordered by `orderindex`.
pub const FORM_FIELDS_TABLE: &str = "form_fields";
/// Parent rows for Family Progress Report submissions.
pub const FPR_ANSWERS_TABLE: &str = "fpr_answers";
/// Per-question rows for Family Progress Report submissions.
pub const FPR_ANSWERS_LIST_TABLE: &str = "fpr_answers_list";
/// Parent rows for Family Introduction Sheet submissions.
pub const FIS_ANSWERS_TABLE: &str = "fis_answers";
/// Per-question rows for Family Introduction Sheet submissions.
pub const FIS_ANSWERS_LIST_TABLE: &str = "fis_answers_list";

/// An equality conjunction over columns: every pair must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter(pub Vec<(String, Value)>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an `column = value` condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result ordering for a select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// A select query: filter, optional ordering, optional inclusive row range.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub filter: Filter,
    pub order: Option<OrderBy>,
    /// Inclusive `(from, to)` row window, zero-based.
    pub range: Option<(u32, u32)>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    pub fn range(mut self, from: u32, to: u32) -> Self {
        self.range = Some((from, to));
        self
    }
}

/// Table-scoped operations against the hosted database service.
///
/// Rows are JSON objects keyed by column name. Implementations must be
/// shareable across tasks; the engine itself awaits calls strictly one
/// at a time.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Read rows matching the query.
    async fn select(&self, table: &str, query: Select) -> Result<Vec<Value>>;

    /// Insert rows; returns the inserted rows including generated columns.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>>;

    /// Apply a partial-object patch to all rows matching the filter.
    async fn update(&self, table: &str, patch: Value, filter: Filter) -> Result<Vec<Value>>;

    /// Delete all rows matching the filter.
    async fn delete(&self, table: &str, filter: Filter) -> Result<()>;
}
