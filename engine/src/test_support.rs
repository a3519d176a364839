//! Shared test double for the remote gateway.

use crate::error::{Error, Result};
use crate::gateway::{Filter, RemoteGateway, Select, FIS_ANSWERS_TABLE, FPR_ANSWERS_TABLE};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Select { table: String },
    Insert { table: String, rows: Vec<Value> },
    Update { table: String, patch: Value, filter: Filter },
    Delete { table: String, filter: Filter },
}

/// In-memory gateway that records every call and fails on demand.
#[derive(Default)]
pub(crate) struct MockGateway {
    pub(crate) calls: Mutex<Vec<Call>>,
    /// Every call against these tables fails.
    fail_tables: Mutex<HashSet<String>>,
    /// Parent inserts carrying these `form_id` values fail.
    fail_form_ids: Mutex<HashSet<String>>,
    /// Rows returned by every select.
    select_rows: Mutex<Vec<Value>>,
    next_answer_id: Mutex<i64>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_table(&self, table: &str) {
        self.fail_tables.lock().unwrap().insert(table.to_string());
    }

    pub(crate) fn unfail_table(&self, table: &str) {
        self.fail_tables.lock().unwrap().remove(table);
    }

    pub(crate) fn fail_form(&self, form_id: &str) {
        self.fail_form_ids.lock().unwrap().insert(form_id.to_string());
    }

    pub(crate) fn unfail_form(&self, form_id: &str) {
        self.fail_form_ids.lock().unwrap().remove(form_id);
    }

    pub(crate) fn set_select_rows(&self, rows: Vec<Value>) {
        *self.select_rows.lock().unwrap() = rows;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn inserted_rows(&self, table: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Insert { table: t, rows } if t == table => Some(rows),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn check_table(&self, table: &str) -> Result<()> {
        if self.fail_tables.lock().unwrap().contains(table) {
            return Err(Error::gateway(table, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn select(&self, table: &str, _query: Select) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push(Call::Select {
            table: table.to_string(),
        });
        self.check_table(table)?;
        Ok(self.select_rows.lock().unwrap().clone())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push(Call::Insert {
            table: table.to_string(),
            rows: rows.clone(),
        });
        self.check_table(table)?;

        {
            let fail_forms = self.fail_form_ids.lock().unwrap();
            for row in &rows {
                if let Some(form_id) = row.get("form_id").and_then(Value::as_str) {
                    if fail_forms.contains(form_id) {
                        return Err(Error::gateway(table, "injected failure"));
                    }
                }
            }
        }

        // Parent answer tables generate an identifier on insert.
        let is_parent = table == FPR_ANSWERS_TABLE || table == FIS_ANSWERS_TABLE;
        let echoed = rows
            .into_iter()
            .map(|mut row| {
                if is_parent {
                    let mut next = self.next_answer_id.lock().unwrap();
                    *next += 1;
                    if let Some(object) = row.as_object_mut() {
                        object.insert("answer_id".to_string(), Value::from(*next));
                    }
                }
                row
            })
            .collect();
        Ok(echoed)
    }

    async fn update(&self, table: &str, patch: Value, filter: Filter) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push(Call::Update {
            table: table.to_string(),
            patch,
            filter,
        });
        self.check_table(table)?;
        Ok(Vec::new())
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Delete {
            table: table.to_string(),
            filter,
        });
        self.check_table(table)
    }
}
