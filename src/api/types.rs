use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workspaces::{
    InvitationStatus, PendingInvitation, Role, Workspace, WorkspaceInvitation, WorkspaceMember,
};
use crate::WorkspaceError;

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Body for `POST /workspaces/:id/invites`. The role is a string so the
/// handler can reject unknown values with a 400 rather than a generic
/// deserialization error.
#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: String,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: i64,
    pub workspace_id: i64,
    pub email: String,
    pub role: Role,
    pub invited_by: i64,
    pub invited_by_email: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// An entry in the caller's pending-invitation listing: invitation fields
/// plus the workspace summary.
#[derive(Debug, Serialize)]
pub struct PendingInvitationResponse {
    pub id: i64,
    pub workspace_id: i64,
    pub workspace_name: String,
    pub role: Role,
    pub invited_by_email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(workspace: Workspace) -> Self {
        WorkspaceResponse {
            id: workspace.id,
            name: workspace.name,
            description: workspace.description,
            created_at: workspace.created_at,
            updated_at: workspace.updated_at,
        }
    }
}

impl From<WorkspaceMember> for MembershipResponse {
    fn from(membership: WorkspaceMember) -> Self {
        MembershipResponse {
            id: membership.id,
            workspace_id: membership.workspace_id,
            user_id: membership.user_id,
            role: membership.role,
            created_at: membership.created_at,
        }
    }
}

impl From<WorkspaceInvitation> for InvitationResponse {
    fn from(invitation: WorkspaceInvitation) -> Self {
        InvitationResponse {
            id: invitation.id,
            workspace_id: invitation.workspace_id,
            email: invitation.email,
            role: invitation.role,
            invited_by: invitation.invited_by,
            invited_by_email: invitation.invited_by_email,
            status: invitation.status,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
        }
    }
}

impl From<PendingInvitation> for PendingInvitationResponse {
    fn from(pending: PendingInvitation) -> Self {
        PendingInvitationResponse {
            id: pending.invitation.id,
            workspace_id: pending.invitation.workspace_id,
            workspace_name: pending.workspace_name,
            role: pending.invitation.role,
            invited_by_email: pending.invitation.invited_by_email,
            created_at: pending.invitation.created_at,
            expires_at: pending.invitation.expires_at,
        }
    }
}

impl From<WorkspaceError> for ErrorResponse {
    fn from(err: WorkspaceError) -> Self {
        // Storage and internal failures are logged server-side; API callers
        // get a generic body.
        let error = match &err {
            WorkspaceError::DatabaseError(_) | WorkspaceError::Internal(_) => {
                "Unexpected error".to_owned()
            }
            _ => err.to_string(),
        };
        ErrorResponse { error }
    }
}
