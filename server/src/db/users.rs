//! Admin panel account persistence.
//!
//! Accounts carry a username and a role; credentials live with the
//! external identity provider and are never stored here.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// What an account is allowed to do in the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UserRole {
    Admin,
    Worker,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Worker => "Worker",
        }
    }

    /// The other role; role changes are a two-state toggle.
    pub fn toggled(&self) -> Self {
        match self {
            UserRole::Admin => UserRole::Worker,
            UserRole::Worker => UserRole::Admin,
        }
    }

    fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "Admin" => Ok(UserRole::Admin),
            "Worker" => Ok(UserRole::Worker),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// One admin panel account.
#[derive(Debug)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for User {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        let raw_role: String = row.try_get("role")?;
        let role = UserRole::parse(&raw_role).map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".into(),
            source: e.into(),
        })?;
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            role,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// All accounts, oldest first.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, role, created_at FROM users ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await
}

/// Look an account up by username.
pub async fn get_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, role, created_at FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Insert an account and return the stored row.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    role: UserRole,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, role)
        VALUES ($1, $2)
        RETURNING id, username, role, created_at
        "#,
    )
    .bind(username)
    .bind(role.as_str())
    .fetch_one(pool)
    .await
}

/// Flip an account between `Admin` and `Worker`. Returns the updated
/// row, or `None` when the account does not exist.
pub async fn toggle_user_role(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET role = CASE role WHEN 'Admin' THEN 'Worker' ELSE 'Admin' END
        WHERE id = $1
        RETURNING id, username, role, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Remove an account and every submission it filed. Returns the
/// removed row, or `None` when the account does not exist.
pub async fn delete_user(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        "DELETE FROM users WHERE id = $1 RETURNING id, username, role, created_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    if let Some(user) = &user {
        // Answer list rows cascade from the parents.
        for table in ["fpr_answers", "fis_answers"] {
            let sql = format!("DELETE FROM {table} WHERE filled_out_by = $1");
            sqlx::query(&sql).bind(&user.username).execute(pool).await?;
        }
    }
    Ok(user)
}
