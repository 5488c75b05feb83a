//! `SQLite` implementation of [`SessionRepository`].
//!
//! Session issuance belongs to the external identity provider; this
//! implementation only resolves tokens the provider has written into the
//! `sessions` table. The [`insert`](SqliteSessionRepository::insert) helper
//! exists for demos and tests standing in for that provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::session::{AuthenticatedUser, SessionRepository};
use crate::WorkspaceError;

/// `SQLite`-backed session repository.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes a session row, standing in for the external identity provider.
    pub async fn insert(
        &self,
        token: &str,
        user_id: i64,
        email: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), WorkspaceError> {
        sqlx::query(
            r"
            INSERT INTO sessions (token, user_id, email, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (token) DO UPDATE SET user_id = ?, email = ?, expires_at = ?
            ",
        )
        .bind(token)
        .bind(user_id)
        .bind(email)
        .bind(expires_at)
        .bind(user_id)
        .bind(email)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"insert_session\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}

#[derive(FromRow)]
struct SessionRecord {
    user_id: i64,
    email: String,
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn resolve(&self, token: &str) -> Result<Option<AuthenticatedUser>, WorkspaceError> {
        let now = Utc::now();

        let row: Option<SessionRecord> = sqlx::query_as(
            "SELECT user_id, email FROM sessions WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"resolve_session\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| AuthenticatedUser {
            id: r.user_id,
            email: r.email,
        }))
    }
}
