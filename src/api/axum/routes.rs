//! Route configuration for the workspace membership endpoints.

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::handlers;
use crate::config::WorkspaceConfig;
use crate::session::SessionRepository;
use crate::workspaces::{InvitationRepository, MembershipRepository, WorkspaceRepository};

/// Application state for the workspace routes.
///
/// Repositories are constructed by the process entry point and injected
/// here; nothing in the crate holds a global storage handle.
#[derive(Clone)]
pub struct AppState<S, W, M, I> {
    /// Session repository, the seam to the external identity provider.
    pub session_repo: S,
    /// Workspace repository.
    pub workspace_repo: W,
    /// Membership repository (the workspace registry).
    pub membership_repo: M,
    /// Invitation repository.
    pub invitation_repo: I,
    /// Invitation policy.
    pub config: WorkspaceConfig,
}

/// Creates the `/workspaces` route tree.
///
/// All routes require a valid bearer session.
///
/// # Routes
///
/// ## Workspaces
/// - `POST /` - Create a workspace (caller becomes owner)
/// - `GET /` - List the caller's workspaces
/// - `GET /:id` - Get workspace details (members)
/// - `PUT /:id` - Update workspace (owner/admin)
///
/// ## Members
/// - `GET /:id/members` - List members (members)
/// - `PUT /:id/members/:user_id` - Change a member's role (owner/admin)
/// - `DELETE /:id/members/:user_id` - Remove a member, or leave
///
/// ## Invitations
/// - `POST /:id/invites` - Invite an email address (owner/admin)
/// - `GET /:id/invites` - List pending invitations (owner/admin)
/// - `DELETE /:id/invites/:invite_id` - Cancel an invitation (owner/admin)
pub fn workspace_routes<S, W, M, I>() -> Router<AppState<S, W, M, I>>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(handlers::create_workspace::<S, W, M, I>))
        .route("/", get(handlers::list_my_workspaces::<S, W, M, I>))
        .route("/:id", get(handlers::get_workspace::<S, W, M, I>))
        .route("/:id", put(handlers::update_workspace::<S, W, M, I>))
        .route(
            "/:id/members",
            get(handlers::list_members::<S, W, M, I>),
        )
        .route(
            "/:id/members/:user_id",
            put(handlers::update_member_role::<S, W, M, I>),
        )
        .route(
            "/:id/members/:user_id",
            delete(handlers::remove_member::<S, W, M, I>),
        )
        .route(
            "/:id/invites",
            post(handlers::create_invitation::<S, W, M, I>),
        )
        .route(
            "/:id/invites",
            get(handlers::list_workspace_invitations::<S, W, M, I>),
        )
        .route(
            "/:id/invites/:invite_id",
            delete(handlers::cancel_invitation::<S, W, M, I>),
        )
}

/// Creates the `/invitations` route tree for the invitee side.
///
/// # Routes
/// - `GET /` - List pending invitations for the caller's email
/// - `POST /:id/accept` - Accept an invitation
/// - `POST /:id/decline` - Decline an invitation
pub fn invitation_routes<S, W, M, I>() -> Router<AppState<S, W, M, I>>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handlers::list_my_invitations::<S, W, M, I>))
        .route(
            "/:id/accept",
            post(handlers::accept_invitation::<S, W, M, I>),
        )
        .route(
            "/:id/decline",
            post(handlers::decline_invitation::<S, W, M, I>),
        )
}
