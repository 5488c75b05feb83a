//! `SQLite` implementation of [`WorkspaceRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::workspaces::{CreateWorkspace, Workspace, WorkspaceRepository};
use crate::WorkspaceError;

/// `SQLite`-backed workspace repository.
#[derive(Clone)]
pub struct SqliteWorkspaceRepository {
    pool: SqlitePool,
}

impl SqliteWorkspaceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct WorkspaceRecord {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WorkspaceRecord> for Workspace {
    fn from(row: WorkspaceRecord) -> Self {
        Workspace {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl WorkspaceRepository for SqliteWorkspaceRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn create(&self, data: CreateWorkspace) -> Result<Workspace, WorkspaceError> {
        let row: WorkspaceRecord = sqlx::query_as(
            r"
            INSERT INTO workspaces (name, description)
            VALUES (?, ?)
            RETURNING id, name, description, created_at, updated_at
            ",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"create_workspace\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Workspace>, WorkspaceError> {
        let row: Option<WorkspaceRecord> = sqlx::query_as(
            "SELECT id, name, description, created_at, updated_at FROM workspaces WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_workspace_by_id\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Workspace, WorkspaceError> {
        let now = Utc::now();

        let row: WorkspaceRecord = sqlx::query_as(
            r"
            UPDATE workspaces
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE id = ?
            RETURNING id, name, description, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => WorkspaceError::NotFound,
            _ => {
                log::error!(target: "anteroom", "msg=\"database error\", operation=\"update_workspace\", error=\"{e}\"");
                WorkspaceError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }
}
