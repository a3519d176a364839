//! PostgreSQL-backed implementation of the engine's `RemoteGateway`.
//!
//! The engine talks to storage through equality filters, ordered
//! selects and row inserts/updates over a fixed set of tables. This
//! module turns those calls into SQL against the server's own
//! database. Only whitelisted tables and plain snake_case column names
//! are accepted; everything else is rejected before any SQL is built.

use async_trait::async_trait;
use famlink_engine::{
    Error as EngineError, Filter, RemoteGateway, Select, FIS_ANSWERS_LIST_TABLE, FIS_ANSWERS_TABLE,
    FORMS_TABLE, FORM_FIELDS_TABLE, FORM_SECTIONS_TABLE, FPR_ANSWERS_LIST_TABLE, FPR_ANSWERS_TABLE,
};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::PgPool;

/// Tables the gateway is allowed to touch.
const ALLOWED_TABLES: &[&str] = &[
    FORMS_TABLE,
    FORM_SECTIONS_TABLE,
    FORM_FIELDS_TABLE,
    FPR_ANSWERS_TABLE,
    FPR_ANSWERS_LIST_TABLE,
    FIS_ANSWERS_TABLE,
    FIS_ANSWERS_LIST_TABLE,
];

/// Gateway over the server's own PostgreSQL pool.
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn check_table(table: &str) -> Result<(), EngineError> {
    if ALLOWED_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(EngineError::gateway(table, "table is not exposed"))
    }
}

/// Column names come from serialized patches and filter keys; only
/// plain identifiers may reach the SQL text.
fn check_ident(table: &str, ident: &str) -> Result<(), EngineError> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(EngineError::gateway(
            table,
            format!("invalid column name '{ident}'"),
        ))
    }
}

fn db_error(table: &str, e: sqlx::Error) -> EngineError {
    tracing::error!(table, error = %e, "gateway query failed");
    EngineError::gateway(table, e.to_string())
}

/// `WHERE c1 = $n AND c2 = $n+1 ...`, or empty for an empty filter.
fn where_clause(filter: &Filter, first_placeholder: usize) -> String {
    if filter.0.is_empty() {
        return String::new();
    }
    let conditions: Vec<String> = filter
        .0
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ${}", first_placeholder + i))
        .collect();
    format!(" WHERE {}", conditions.join(" AND "))
}

fn build_select_sql(table: &str, query: &Select) -> String {
    let mut sql = format!("SELECT to_jsonb(t) FROM {table} t");
    sql.push_str(&where_clause(&query.filter, 1));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "ASC" } else { "DESC" };
        sql.push_str(&format!(" ORDER BY {} {direction}", order.column));
    }
    if let Some((from, to)) = query.range {
        let limit = to.saturating_sub(from) + 1;
        sql.push_str(&format!(" LIMIT {limit} OFFSET {from}"));
    }
    sql
}

/// One `INSERT` statement covering every row, so a multi-row insert is
/// atomic: either all rows land or none do. The engine's retry logic
/// relies on that per-call atomicity.
fn build_insert_sql(table: &str, columns: &[String], row_count: usize) -> String {
    let width = columns.len();
    let groups: Vec<String> = (0..row_count)
        .map(|row| {
            let placeholders: Vec<String> = (1..=width)
                .map(|i| format!("${}", row * width + i))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {table} AS t ({}) VALUES {} RETURNING to_jsonb(t)",
        columns.join(", "),
        groups.join(", ")
    )
}

fn build_update_sql(table: &str, columns: &[&String], filter: &Filter) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 1))
        .collect();
    format!(
        "UPDATE {table} AS t SET {}{} RETURNING to_jsonb(t)",
        assignments.join(", "),
        where_clause(filter, columns.len() + 1)
    )
}

fn build_delete_sql(table: &str, filter: &Filter) -> String {
    format!("DELETE FROM {table}{}", where_clause(filter, 1))
}

type ScalarQuery<'q> = sqlx::query::QueryScalar<'q, sqlx::Postgres, Value, PgArguments>;
type PlainQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

/// Bind a JSON value as the closest SQL type: scalars map to text,
/// bool and numbers; arrays and objects go in as jsonb.
fn bind_scalar<'q>(query: ScalarQuery<'q>, value: &'q Value) -> ScalarQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.as_str()),
        other => query.bind(other.clone()),
    }
}

fn bind_plain<'q>(query: PlainQuery<'q>, value: &'q Value) -> PlainQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.as_str()),
        other => query.bind(other.clone()),
    }
}

#[async_trait]
impl RemoteGateway for PgGateway {
    async fn select(&self, table: &str, query: Select) -> famlink_engine::error::Result<Vec<Value>> {
        check_table(table)?;
        for (column, _) in &query.filter.0 {
            check_ident(table, column)?;
        }
        if let Some(order) = &query.order {
            check_ident(table, &order.column)?;
        }

        let sql = build_select_sql(table, &query);
        let mut q = sqlx::query_scalar::<_, Value>(&sql);
        for (_, value) in &query.filter.0 {
            q = bind_scalar(q, value);
        }
        q.fetch_all(&self.pool).await.map_err(|e| db_error(table, e))
    }

    async fn insert(
        &self,
        table: &str,
        rows: Vec<Value>,
    ) -> famlink_engine::error::Result<Vec<Value>> {
        check_table(table)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::with_capacity(rows.len());
        for row in &rows {
            objects.push(row.as_object().ok_or_else(|| {
                EngineError::gateway(table, "insert row must be a JSON object")
            })?);
        }

        // All rows go into one statement, so they must agree on columns.
        let columns: Vec<String> = objects[0].keys().cloned().collect();
        if columns.is_empty() {
            return Err(EngineError::gateway(table, "insert row has no columns"));
        }
        for column in &columns {
            check_ident(table, column)?;
        }
        for object in &objects {
            if object.len() != columns.len()
                || !columns.iter().all(|column| object.contains_key(column))
            {
                return Err(EngineError::gateway(
                    table,
                    "insert rows must share one column set",
                ));
            }
        }

        let sql = build_insert_sql(table, &columns, objects.len());
        let mut q = sqlx::query_scalar::<_, Value>(&sql);
        for object in &objects {
            for column in &columns {
                q = bind_scalar(q, &object[column.as_str()]);
            }
        }
        q.fetch_all(&self.pool).await.map_err(|e| db_error(table, e))
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filter: Filter,
    ) -> famlink_engine::error::Result<Vec<Value>> {
        check_table(table)?;
        let object = patch
            .as_object()
            .ok_or_else(|| EngineError::gateway(table, "update patch must be a JSON object"))?;
        if object.is_empty() {
            return Err(EngineError::gateway(table, "update patch has no columns"));
        }
        let columns: Vec<&String> = object.keys().collect();
        for column in &columns {
            check_ident(table, column)?;
        }
        for (column, _) in &filter.0 {
            check_ident(table, column)?;
        }

        let sql = build_update_sql(table, &columns, &filter);
        let mut q = sqlx::query_scalar::<_, Value>(&sql);
        for column in &columns {
            q = bind_scalar(q, &object[column.as_str()]);
        }
        for (_, value) in &filter.0 {
            q = bind_scalar(q, value);
        }
        q.fetch_all(&self.pool).await.map_err(|e| db_error(table, e))
    }

    async fn delete(&self, table: &str, filter: Filter) -> famlink_engine::error::Result<()> {
        check_table(table)?;
        if filter.0.is_empty() {
            // A bare DELETE would truncate the table; the engine always
            // filters, so treat this as a caller bug.
            return Err(EngineError::gateway(table, "refusing unfiltered delete"));
        }
        for (column, _) in &filter.0 {
            check_ident(table, column)?;
        }

        let sql = build_delete_sql(table, &filter);
        let mut q = sqlx::query(&sql);
        for (_, value) in &filter.0 {
            q = bind_plain(q, value);
        }
        q.execute(&self.pool).await.map_err(|e| db_error(table, e))?;
        Ok(())
    }
}
