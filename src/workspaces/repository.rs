use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{
    PendingInvitation, Role, Workspace, WorkspaceInvitation, WorkspaceMember,
};
use crate::WorkspaceError;

#[derive(Debug, Clone)]
pub struct CreateWorkspace {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateMembership {
    pub workspace_id: i64,
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub workspace_id: i64,
    /// Stored lowercase; implementations normalize on write.
    pub email: String,
    pub role: Role,
    pub invited_by: i64,
    pub invited_by_email: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn create(&self, data: CreateWorkspace) -> Result<Workspace, WorkspaceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Workspace>, WorkspaceError>;
    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Workspace, WorkspaceError>;
}

/// The workspace registry: membership rows keyed by `(workspace_id, user_id)`.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Idempotent insert-or-update. Used at workspace creation (creator
    /// becomes owner) and at invitation acceptance; an existing row gets its
    /// role overwritten with the granted one.
    async fn upsert(&self, data: CreateMembership) -> Result<WorkspaceMember, WorkspaceError>;
    async fn find_by_workspace_and_user(
        &self,
        workspace_id: i64,
        user_id: i64,
    ) -> Result<Option<WorkspaceMember>, WorkspaceError>;
    async fn find_by_workspace(
        &self,
        workspace_id: i64,
    ) -> Result<Vec<WorkspaceMember>, WorkspaceError>;
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<WorkspaceMember>, WorkspaceError>;
    async fn update_role(
        &self,
        workspace_id: i64,
        user_id: i64,
        role: Role,
    ) -> Result<WorkspaceMember, WorkspaceError>;
    async fn delete(&self, workspace_id: i64, user_id: i64) -> Result<(), WorkspaceError>;
    /// Number of members holding [`Role::Owner`], for the last-owner guard.
    async fn count_owners(&self, workspace_id: i64) -> Result<i64, WorkspaceError>;
}

/// Invitation storage, including the transactional terminal transitions.
///
/// Email parameters are matched case-insensitively; implementations
/// normalize to lowercase on both write and query.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, data: CreateInvitation)
        -> Result<WorkspaceInvitation, WorkspaceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<WorkspaceInvitation>, WorkspaceError>;
    /// Pending, unexpired invitations for an email, newest first, each
    /// joined with the workspace name.
    async fn find_pending_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<PendingInvitation>, WorkspaceError>;
    /// Pending, unexpired invitations for a workspace, newest first.
    async fn find_pending_by_workspace(
        &self,
        workspace_id: i64,
    ) -> Result<Vec<WorkspaceInvitation>, WorkspaceError>;
    /// Whether a pending, unexpired invitation exists for this workspace
    /// and email.
    async fn has_pending(&self, workspace_id: i64, email: &str)
        -> Result<bool, WorkspaceError>;

    /// Flips a pending invitation to accepted and upserts the membership
    /// row with the granted role, atomically.
    ///
    /// The pending check and both writes happen in one transaction, so of
    /// two concurrent accept/decline/cancel calls exactly one succeeds.
    /// Returns [`WorkspaceError::NotPending`] when the row is already
    /// terminal and [`WorkspaceError::NotFound`] when it does not exist.
    async fn accept(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<(WorkspaceInvitation, WorkspaceMember), WorkspaceError>;

    /// Flips a pending invitation to declined. Same conflict rules as
    /// [`accept`](Self::accept); no membership side effect.
    async fn decline(&self, id: i64) -> Result<WorkspaceInvitation, WorkspaceError>;

    /// Hard-deletes a pending invitation. Returns
    /// [`WorkspaceError::NotPending`] when the row exists but is terminal,
    /// [`WorkspaceError::NotFound`] when it does not exist.
    async fn cancel(&self, id: i64) -> Result<(), WorkspaceError>;

    /// Optional sweep: deletes invitations past their expiry horizon and
    /// returns how many were removed. Read paths never rely on this.
    async fn delete_expired(&self) -> Result<u64, WorkspaceError>;
}
