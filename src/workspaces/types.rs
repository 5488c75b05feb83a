//! Core types for workspace membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validators::ValidationError;

/// Capability tier of a workspace member.
///
/// Owner and admin can manage members and invitations; member can only
/// participate. Stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    /// String form used for database storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// Parses a role, accepting any casing ("ADMIN" and "admin" both work).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            _ => Err(ValidationError::UnknownRole(s.to_owned())),
        }
    }

    /// Whether this role may invite, cancel invitations, remove members and
    /// change roles in its workspace.
    pub fn can_manage_members(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

/// Lifecycle state of an invitation.
///
/// Transitions are one-way: pending goes to accepted or declined through
/// user action, and nothing leaves a terminal state. `Expired` is a
/// reportable state for rows past their horizon; expiry is enforced by
/// filtering at read time, not by a background sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    /// String form used for database storage.
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Expired => "expired",
        }
    }

    /// Parses a stored status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvitationStatus::Pending),
            "accepted" => Some(InvitationStatus::Accepted),
            "declined" => Some(InvitationStatus::Declined),
            "expired" => Some(InvitationStatus::Expired),
            _ => None,
        }
    }
}

/// A workspace is the tenant boundary grouping members and invitations.
///
/// Ownership is not a column here: the owner is whoever holds the
/// [`Role::Owner`] membership row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links a user to a workspace with a role.
///
/// Unique per `(workspace_id, user_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pending offer of membership, bound to an email address and an expiry.
///
/// `email` is stored lowercase; all matching against it is
/// case-insensitive. `invited_by_email` is denormalized from the inviter's
/// session at creation time so listings can show who invited without a
/// user store (user identity lives in an external system).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInvitation {
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

impl WorkspaceInvitation {
    /// Check if the invitation is past its expiry horizon.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Check if the invitation is still pending.
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Case-insensitive comparison against an authenticated user's email.
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

/// Read model for a user's pending invitations: the invitation joined with
/// a summary of the workspace it opens.
#[derive(Debug, Clone, Serialize)]
pub struct PendingInvitation {
    pub invitation: WorkspaceInvitation,
    pub workspace_name: String,
}
