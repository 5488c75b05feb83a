//! `SQLite` implementation of [`MembershipRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::workspaces::{CreateMembership, MembershipRepository, Role, WorkspaceMember};
use crate::WorkspaceError;

/// `SQLite`-backed membership repository.
#[derive(Clone)]
pub struct SqliteMembershipRepository {
    pool: SqlitePool,
}

impl SqliteMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
pub(super) struct MemberRecord {
    id: i64,
    workspace_id: i64,
    user_id: i64,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRecord> for WorkspaceMember {
    type Error = WorkspaceError;

    fn try_from(row: MemberRecord) -> Result<Self, WorkspaceError> {
        let role = Role::parse(&row.role).map_err(|_| {
            WorkspaceError::DatabaseError(format!(
                "unrecognized role \"{}\" on membership {}",
                row.role, row.id
            ))
        })?;
        Ok(WorkspaceMember {
            id: row.id,
            workspace_id: row.workspace_id,
            user_id: row.user_id,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl MembershipRepository for SqliteMembershipRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn upsert(&self, data: CreateMembership) -> Result<WorkspaceMember, WorkspaceError> {
        let now = Utc::now();

        let row: MemberRecord = sqlx::query_as(
            r"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES (?, ?, ?)
            ON CONFLICT (workspace_id, user_id)
            DO UPDATE SET role = excluded.role, updated_at = ?
            RETURNING id, workspace_id, user_id, role, created_at, updated_at
            ",
        )
        .bind(data.workspace_id)
        .bind(data.user_id)
        .bind(data.role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"upsert_membership\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_workspace_and_user(
        &self,
        workspace_id: i64,
        user_id: i64,
    ) -> Result<Option<WorkspaceMember>, WorkspaceError> {
        let row: Option<MemberRecord> = sqlx::query_as(
            "SELECT id, workspace_id, user_id, role, created_at, updated_at FROM workspace_members WHERE workspace_id = ? AND user_id = ?",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_membership\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_workspace(
        &self,
        workspace_id: i64,
    ) -> Result<Vec<WorkspaceMember>, WorkspaceError> {
        let rows: Vec<MemberRecord> = sqlx::query_as(
            "SELECT id, workspace_id, user_id, role, created_at, updated_at FROM workspace_members WHERE workspace_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_memberships_by_workspace\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<WorkspaceMember>, WorkspaceError> {
        let rows: Vec<MemberRecord> = sqlx::query_as(
            "SELECT id, workspace_id, user_id, role, created_at, updated_at FROM workspace_members WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_memberships_by_user\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_role(
        &self,
        workspace_id: i64,
        user_id: i64,
        role: Role,
    ) -> Result<WorkspaceMember, WorkspaceError> {
        let now = Utc::now();

        let row: MemberRecord = sqlx::query_as(
            r"
            UPDATE workspace_members SET role = ?, updated_at = ?
            WHERE workspace_id = ? AND user_id = ?
            RETURNING id, workspace_id, user_id, role, created_at, updated_at
            ",
        )
        .bind(role.as_str())
        .bind(now)
        .bind(workspace_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => WorkspaceError::NotFound,
            _ => {
                log::error!(target: "anteroom", "msg=\"database error\", operation=\"update_membership_role\", error=\"{e}\"");
                WorkspaceError::DatabaseError(e.to_string())
            }
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, workspace_id: i64, user_id: i64) -> Result<(), WorkspaceError> {
        sqlx::query("DELETE FROM workspace_members WHERE workspace_id = ? AND user_id = ?")
            .bind(workspace_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "anteroom", "msg=\"database error\", operation=\"delete_membership\", error=\"{e}\"");
                WorkspaceError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_owners(&self, workspace_id: i64) -> Result<i64, WorkspaceError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workspace_members WHERE workspace_id = ? AND role = 'owner'",
        )
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"count_owners\", error=\"{e}\"");
            WorkspaceError::DatabaseError(e.to_string())
        })?;

        Ok(count)
    }
}
