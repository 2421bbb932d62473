//! User Repository

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{from_millis, now_millis, with_timeout, UserRepository, DEFAULT_STORE_TIMEOUT};
use crate::domain::{normalize_email, NewUser, User};
use crate::error::{PlatformError, Result};

pub(crate) const USER_COLUMNS: &str = "id, email, name, password_hash, created_at";

pub struct SqliteUserRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        created_at: from_millis(row.try_get("created_at")?)?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User> {
        let created_at = now_millis();

        let result = with_timeout(self.timeout, "users.insert", async {
            sqlx::query("INSERT INTO users (email, password_hash, name, created_at) VALUES (?, ?, ?, ?)")
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.name)
                .bind(created_at.timestamp_millis())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if PlatformError::is_unique_violation(&e) {
                        PlatformError::duplicate("User", "email", &user.email)
                    } else {
                        PlatformError::from(e)
                    }
                })
        })
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: user.email.clone(),
            name: user.name.clone(),
            password_hash: user.password_hash.clone(),
            created_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        debug!(user_id = id, "Looking up user");
        with_timeout(self.timeout, "users.find_by_id", async {
            let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
            let row = sqlx::query(&query)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(user_from_row).transpose()
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        with_timeout(self.timeout, "users.find_by_email", async {
            let query = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
            let row = sqlx::query(&query)
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(user_from_row).transpose()
        })
        .await
    }
}
