//! `SQLite` implementation of [`InvitationRepository`].
//!
//! The terminal transitions (`accept`, `decline`, `cancel`) are conditional
//! writes guarded on `status = 'pending'`, so concurrent callers racing on
//! the same invitation resolve to exactly one winner. `accept` runs the
//! status flip and the membership upsert in a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::membership::MemberRecord;
use crate::workspaces::{
    CreateInvitation, InvitationRepository, InvitationStatus, PendingInvitation, Role,
    WorkspaceInvitation, WorkspaceMember,
};
use crate::WorkspaceError;

/// `SQLite`-backed invitation repository.
#[derive(Clone)]
pub struct SqliteInvitationRepository {
    pool: SqlitePool,
}

impl SqliteInvitationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const INVITATION_COLUMNS: &str =
    "id, workspace_id, email, role, invited_by, invited_by_email, status, created_at, expires_at";

#[derive(FromRow)]
struct InvitationRecord {
    id: i64,
    workspace_id: i64,
    email: String,
    role: String,
    invited_by: i64,
    invited_by_email: String,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<InvitationRecord> for WorkspaceInvitation {
    type Error = WorkspaceError;

    fn try_from(row: InvitationRecord) -> Result<Self, WorkspaceError> {
        let role = Role::parse(&row.role).map_err(|_| {
            WorkspaceError::DatabaseError(format!(
                "unrecognized role \"{}\" on invitation {}",
                row.role, row.id
            ))
        })?;
        let status = InvitationStatus::parse(&row.status).ok_or_else(|| {
            WorkspaceError::DatabaseError(format!(
                "unrecognized status \"{}\" on invitation {}",
                row.status, row.id
            ))
        })?;
        Ok(WorkspaceInvitation {
            id: row.id,
            workspace_id: row.workspace_id,
            email: row.email,
            role,
            invited_by: row.invited_by,
            invited_by_email: row.invited_by_email,
            status,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

/// Invitation row joined with the workspace name, for pending listings.
#[derive(FromRow)]
struct PendingRecord {
    id: i64,
    workspace_id: i64,
    email: String,
    role: String,
    invited_by: i64,
    invited_by_email: String,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    workspace_name: String,
}

impl TryFrom<PendingRecord> for PendingInvitation {
    type Error = WorkspaceError;

    fn try_from(row: PendingRecord) -> Result<Self, WorkspaceError> {
        let workspace_name = row.workspace_name.clone();
        let invitation = InvitationRecord {
            id: row.id,
            workspace_id: row.workspace_id,
            email: row.email,
            role: row.role,
            invited_by: row.invited_by,
            invited_by_email: row.invited_by_email,
            status: row.status,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
        .try_into()?;
        Ok(PendingInvitation {
            invitation,
            workspace_name,
        })
    }
}

fn db_err(operation: &str) -> impl Fn(sqlx::Error) -> WorkspaceError + '_ {
    move |e| {
        log::error!(
            target: "anteroom",
            "msg=\"database error\", operation=\"{operation}\", error=\"{e}\""
        );
        WorkspaceError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl InvitationRepository for SqliteInvitationRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn create(
        &self,
        data: CreateInvitation,
    ) -> Result<WorkspaceInvitation, WorkspaceError> {
        let row: InvitationRecord = sqlx::query_as(&format!(
            r"
            INSERT INTO workspace_invitations
                (workspace_id, email, role, invited_by, invited_by_email, status, expires_at)
            VALUES (?, ?, ?, ?, ?, 'pending', ?)
            RETURNING {INVITATION_COLUMNS}
            ",
        ))
        .bind(data.workspace_id)
        .bind(data.email.to_lowercase())
        .bind(data.role.as_str())
        .bind(data.invited_by)
        .bind(&data.invited_by_email)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("create_invitation"))?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: i64) -> Result<Option<WorkspaceInvitation>, WorkspaceError> {
        let row: Option<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM workspace_invitations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("find_invitation_by_id"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_pending_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<PendingInvitation>, WorkspaceError> {
        let now = Utc::now();

        let rows: Vec<PendingRecord> = sqlx::query_as(
            r"
            SELECT i.id, i.workspace_id, i.email, i.role, i.invited_by, i.invited_by_email,
                   i.status, i.created_at, i.expires_at, w.name AS workspace_name
            FROM workspace_invitations i
            JOIN workspaces w ON w.id = i.workspace_id
            WHERE i.email = ? AND i.status = 'pending' AND i.expires_at > ?
            ORDER BY i.created_at DESC, i.id DESC
            ",
        )
        .bind(email.to_lowercase())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("find_pending_invitations_by_email"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_pending_by_workspace(
        &self,
        workspace_id: i64,
    ) -> Result<Vec<WorkspaceInvitation>, WorkspaceError> {
        let now = Utc::now();

        let rows: Vec<InvitationRecord> = sqlx::query_as(&format!(
            r"
            SELECT {INVITATION_COLUMNS}
            FROM workspace_invitations
            WHERE workspace_id = ? AND status = 'pending' AND expires_at > ?
            ORDER BY created_at DESC, id DESC
            ",
        ))
        .bind(workspace_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("find_pending_invitations_by_workspace"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn has_pending(
        &self,
        workspace_id: i64,
        email: &str,
    ) -> Result<bool, WorkspaceError> {
        let now = Utc::now();

        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM workspace_invitations
                WHERE workspace_id = ? AND email = ? AND status = 'pending' AND expires_at > ?
            )
            ",
        )
        .bind(workspace_id)
        .bind(email.to_lowercase())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("has_pending_invitation"))?;

        Ok(exists)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn accept(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<(WorkspaceInvitation, WorkspaceMember), WorkspaceError> {
        let mut tx = self.pool.begin().await.map_err(db_err("accept_invitation"))?;

        // The conditional update is the race guard: of two concurrent
        // terminal transitions, only one sees the pending row.
        let flipped: Option<InvitationRecord> = sqlx::query_as(&format!(
            r"
            UPDATE workspace_invitations SET status = 'accepted'
            WHERE id = ? AND status = 'pending'
            RETURNING {INVITATION_COLUMNS}
            ",
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("accept_invitation"))?;

        let Some(row) = flipped else {
            drop(tx);
            return match self.find_by_id(id).await? {
                Some(_) => Err(WorkspaceError::NotPending),
                None => Err(WorkspaceError::NotFound),
            };
        };

        let invitation: WorkspaceInvitation = row.try_into()?;

        let now = Utc::now();
        let member_row: MemberRecord = sqlx::query_as(
            r"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES (?, ?, ?)
            ON CONFLICT (workspace_id, user_id)
            DO UPDATE SET role = excluded.role, updated_at = ?
            RETURNING id, workspace_id, user_id, role, created_at, updated_at
            ",
        )
        .bind(invitation.workspace_id)
        .bind(user_id)
        .bind(invitation.role.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("accept_invitation"))?;

        tx.commit().await.map_err(db_err("accept_invitation"))?;

        Ok((invitation, member_row.try_into()?))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn decline(&self, id: i64) -> Result<WorkspaceInvitation, WorkspaceError> {
        let flipped: Option<InvitationRecord> = sqlx::query_as(&format!(
            r"
            UPDATE workspace_invitations SET status = 'declined'
            WHERE id = ? AND status = 'pending'
            RETURNING {INVITATION_COLUMNS}
            ",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("decline_invitation"))?;

        match flipped {
            Some(row) => row.try_into(),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(WorkspaceError::NotPending),
                None => Err(WorkspaceError::NotFound),
            },
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn cancel(&self, id: i64) -> Result<(), WorkspaceError> {
        let result = sqlx::query(
            "DELETE FROM workspace_invitations WHERE id = ? AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err("cancel_invitation"))?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => Err(WorkspaceError::NotPending),
                None => Err(WorkspaceError::NotFound),
            };
        }

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_expired(&self) -> Result<u64, WorkspaceError> {
        let now = Utc::now();

        let result = sqlx::query("DELETE FROM workspace_invitations WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_expired_invitations"))?;

        Ok(result.rows_affected())
    }
}
