//! HTTP handlers for workspace and invitation endpoints.
//!
//! Handlers stay thin: parse and validate the request, hand off to the
//! action layer, convert the result. All authorization lives in the
//! actions and the [`AccessEvaluator`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::error::AppError;
use super::middleware::CurrentUser;
use super::routes::AppState;
use crate::api::{
    CreateWorkspaceRequest, InvitationResponse, InviteMemberRequest, MembershipResponse,
    MessageResponse, PendingInvitationResponse, SuccessResponse, UpdateMemberRoleRequest,
    UpdateWorkspaceRequest, WorkspaceResponse,
};
use crate::session::SessionRepository;
use crate::validators::validate_workspace_name;
use crate::workspaces::{
    AcceptInvitationAction, AccessEvaluator, CancelInvitationAction, ChangeRoleAction,
    CreateInvitationAction, CreateInvitationInput, CreateMembership, CreateWorkspace,
    DeclineInvitationAction, InvitationRepository, MembershipRepository, RemoveMemberAction, Role,
    WorkspaceRepository,
};
use crate::WorkspaceError;

/// Create a workspace; the creator becomes its owner.
///
/// POST /workspaces
pub async fn create_workspace<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Json(body): Json<CreateWorkspaceRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    validate_workspace_name(&body.name)?;

    let workspace = state
        .workspace_repo
        .create(CreateWorkspace {
            name: body.name,
            description: body.description,
        })
        .await?;

    state
        .membership_repo
        .upsert(CreateMembership {
            workspace_id: workspace.id,
            user_id: user.user().id,
            role: Role::Owner,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(WorkspaceResponse::from(workspace)),
    ))
}

/// List the caller's workspaces.
///
/// GET /workspaces
pub async fn list_my_workspaces<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
) -> Result<Json<Vec<WorkspaceResponse>>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    let memberships = state.membership_repo.find_by_user(user.user().id).await?;

    let mut workspaces = Vec::with_capacity(memberships.len());
    for membership in memberships {
        if let Some(workspace) = state
            .workspace_repo
            .find_by_id(membership.workspace_id)
            .await?
        {
            workspaces.push(WorkspaceResponse::from(workspace));
        }
    }

    Ok(Json(workspaces))
}

/// Get one workspace; members only.
///
/// GET /workspaces/:id
pub async fn get_workspace<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path(workspace_id): Path<i64>,
) -> Result<Json<WorkspaceResponse>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    AccessEvaluator::new(state.membership_repo.clone())
        .require_member(user.user().id, workspace_id)
        .await?;

    let workspace = state
        .workspace_repo
        .find_by_id(workspace_id)
        .await?
        .ok_or(WorkspaceError::NotFound)?;

    Ok(Json(WorkspaceResponse::from(workspace)))
}

/// Update workspace name or description; owner/admin only.
///
/// PUT /workspaces/:id
pub async fn update_workspace<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path(workspace_id): Path<i64>,
    Json(body): Json<UpdateWorkspaceRequest>,
) -> Result<Json<WorkspaceResponse>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    if let Some(name) = &body.name {
        validate_workspace_name(name)?;
    }

    AccessEvaluator::new(state.membership_repo.clone())
        .require_manager(user.user().id, workspace_id)
        .await?;

    let workspace = state
        .workspace_repo
        .update(workspace_id, body.name.as_deref(), body.description.as_deref())
        .await?;

    Ok(Json(WorkspaceResponse::from(workspace)))
}

/// List workspace members; members only.
///
/// GET /workspaces/:id/members
pub async fn list_members<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path(workspace_id): Path<i64>,
) -> Result<Json<Vec<MembershipResponse>>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    AccessEvaluator::new(state.membership_repo.clone())
        .require_member(user.user().id, workspace_id)
        .await?;

    let members = state.membership_repo.find_by_workspace(workspace_id).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Change a member's role.
///
/// PUT /workspaces/:id/members/:user_id
pub async fn update_member_role<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path((workspace_id, target_user_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateMemberRoleRequest>,
) -> Result<Json<MembershipResponse>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    let role = Role::parse(&body.role)?;

    let action = ChangeRoleAction::new(state.membership_repo.clone());
    let membership = action
        .execute(workspace_id, user.user().id, target_user_id, role)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

/// Remove a member, or leave the workspace.
///
/// DELETE /workspaces/:id/members/:user_id
pub async fn remove_member<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path((workspace_id, target_user_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    let action = RemoveMemberAction::new(state.membership_repo.clone());
    action
        .execute(workspace_id, user.user().id, target_user_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "member removed".to_owned(),
    }))
}

/// Invite an email address into a workspace; owner/admin only.
///
/// POST /workspaces/:id/invites
pub async fn create_invitation<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path(workspace_id): Path<i64>,
    Json(body): Json<InviteMemberRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let role = Role::parse(&body.role)?;

    let action = CreateInvitationAction::with_config(
        state.membership_repo.clone(),
        state.invitation_repo.clone(),
        state.config.clone(),
    );

    let invitation = action
        .execute(CreateInvitationInput {
            workspace_id,
            inviter_id: user.user().id,
            inviter_email: user.user().email.clone(),
            email: body.email,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InvitationResponse::from(invitation)),
    ))
}

/// List a workspace's pending invitations; owner/admin only.
///
/// GET /workspaces/:id/invites
pub async fn list_workspace_invitations<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path(workspace_id): Path<i64>,
) -> Result<Json<Vec<InvitationResponse>>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    AccessEvaluator::new(state.membership_repo.clone())
        .require_manager(user.user().id, workspace_id)
        .await?;

    let invitations = state
        .invitation_repo
        .find_pending_by_workspace(workspace_id)
        .await?;

    Ok(Json(invitations.into_iter().map(Into::into).collect()))
}

/// Cancel a pending invitation; owner/admin only.
///
/// DELETE /workspaces/:id/invites/:invite_id
pub async fn cancel_invitation<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path((workspace_id, invitation_id)): Path<(i64, i64)>,
) -> Result<Json<SuccessResponse>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let action = CancelInvitationAction::new(
        state.membership_repo.clone(),
        state.invitation_repo.clone(),
    );
    action
        .execute(workspace_id, invitation_id, user.user().id)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// List the caller's pending invitations across all workspaces.
///
/// GET /invitations
pub async fn list_my_invitations<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
) -> Result<Json<Vec<PendingInvitationResponse>>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let pending = state
        .invitation_repo
        .find_pending_by_email(&user.user().email)
        .await?;

    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// Accept an invitation addressed to the caller's email.
///
/// POST /invitations/:id/accept
pub async fn accept_invitation<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path(invitation_id): Path<i64>,
) -> Result<Json<MembershipResponse>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let action = AcceptInvitationAction::new(state.invitation_repo.clone());
    let membership = action
        .execute(invitation_id, user.user().id, &user.user().email)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

/// Decline an invitation addressed to the caller's email.
///
/// POST /invitations/:id/decline
pub async fn decline_invitation<S, W, M, I>(
    State(state): State<AppState<S, W, M, I>>,
    user: CurrentUser<S>,
    Path(invitation_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
{
    let action = DeclineInvitationAction::new(state.invitation_repo.clone());
    action
        .execute(invitation_id, &user.user().email)
        .await?;

    Ok(Json(MessageResponse {
        message: "invitation declined".to_owned(),
    }))
}
