//! Workspace membership and invitation lifecycle for multi-tenant applications.
//!
//! `anteroom` owns the path from "invite an email address into a workspace"
//! to "that person is a member with a role": creating, listing, accepting,
//! declining and cancelling invitations, plus the role checks that gate
//! every workspace-mutating operation.
//!
//! Storage is abstracted behind repository traits. The crate ships an
//! in-memory implementation for tests (`mocks` feature), a `SQLite`
//! implementation (`sqlx_sqlite` feature) and an optional JSON HTTP layer
//! built on Axum (`axum_api` feature).
//!
//! Authentication is deliberately out of scope: callers provide a
//! [`SessionRepository`] that resolves a bearer token to an authenticated
//! user identity (id plus verified email). Everything else in the crate
//! trusts that identity.

use std::fmt;

pub mod config;
pub mod session;
pub mod validators;
pub mod workspaces;

#[cfg(feature = "axum_api")]
pub mod api;
#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;

pub use config::WorkspaceConfig;
#[cfg(feature = "mocks")]
pub use session::MockSessionRepository;
pub use session::{AuthenticatedUser, SessionRepository};
pub use validators::ValidationError;

/// Crate-wide error type.
///
/// Every public operation returns `Result<_, WorkspaceError>`. The variants
/// map one-to-one onto the HTTP status codes used by the `axum_api` layer:
/// validation 400, missing session 401, authorization 403, absent resource
/// 404, state conflicts 409, storage failures 500.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceError {
    /// Malformed or missing input.
    Validation(ValidationError),
    /// No valid session was presented.
    Unauthenticated,
    /// The caller's role in the workspace does not permit the operation.
    /// Also covers "not a member at all", so callers cannot distinguish a
    /// workspace they were removed from and one that never existed.
    Forbidden,
    /// The invitation belongs to a different email address than the
    /// authenticated user's.
    EmailMismatch,
    /// The resource does not exist or is outside the requester's scope.
    NotFound,
    /// The invitation already reached a terminal state. Also the outcome for
    /// the loser of a concurrent accept/decline/cancel race.
    NotPending,
    /// The invitation's expiry horizon has passed.
    Expired,
    /// A pending invitation for this email and workspace already exists.
    AlreadyInvited,
    /// Removing or demoting the only owner of a workspace is rejected.
    LastOwner,
    /// Storage-level failure. The message is logged server-side and never
    /// shown to API callers.
    DatabaseError(String),
    /// Unexpected internal failure (lock poisoning and similar).
    Internal(String),
}

impl std::error::Error for WorkspaceError {}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceError::Validation(err) => write!(f, "{err}"),
            WorkspaceError::Unauthenticated => write!(f, "Authentication required"),
            WorkspaceError::Forbidden => write!(f, "Insufficient role for this workspace"),
            WorkspaceError::EmailMismatch => {
                write!(f, "Invitation is for a different email address")
            }
            WorkspaceError::NotFound => write!(f, "Resource not found"),
            WorkspaceError::NotPending => write!(f, "Invitation is no longer pending"),
            WorkspaceError::Expired => write!(f, "Invitation has expired"),
            WorkspaceError::AlreadyInvited => {
                write!(f, "A pending invitation already exists for this email")
            }
            WorkspaceError::LastOwner => {
                write!(f, "Cannot remove or demote the only owner of a workspace")
            }
            WorkspaceError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            WorkspaceError::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<ValidationError> for WorkspaceError {
    fn from(err: ValidationError) -> Self {
        WorkspaceError::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_display_carries_detail_for_logs() {
        let err = WorkspaceError::DatabaseError("UNIQUE constraint failed".to_owned());
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: WorkspaceError = ValidationError::EmailEmpty.into();
        assert_eq!(err, WorkspaceError::Validation(ValidationError::EmailEmpty));
    }
}
