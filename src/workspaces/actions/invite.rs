use chrono::Utc;

use crate::config::WorkspaceConfig;
use crate::validators::{validate_email, ValidationError};
use crate::workspaces::{
    AccessEvaluator, CreateInvitation, InvitationRepository, MembershipRepository, Role,
    WorkspaceInvitation,
};
use crate::WorkspaceError;

/// Input data for creating a workspace invitation.
///
/// `inviter_email` comes from the inviter's session and is denormalized
/// onto the invitation so pending listings can show who sent it.
#[derive(Debug, Clone)]
pub struct CreateInvitationInput {
    pub workspace_id: i64,
    pub inviter_id: i64,
    pub inviter_email: String,
    pub email: String,
    pub role: Role,
}

/// Action to invite an email address into a workspace.
///
/// The inviter must hold owner or admin in the workspace. The invitee's
/// email is normalized to lowercase and the expiry horizon comes from
/// [`WorkspaceConfig::invitation_expiry`].
pub struct CreateInvitationAction<M, I>
where
    M: MembershipRepository,
    I: InvitationRepository,
{
    access: AccessEvaluator<M>,
    invitation_repo: I,
    config: WorkspaceConfig,
}

impl<M, I> CreateInvitationAction<M, I>
where
    M: MembershipRepository,
    I: InvitationRepository,
{
    /// Creates the action with default configuration.
    pub fn new(membership_repo: M, invitation_repo: I) -> Self {
        Self::with_config(membership_repo, invitation_repo, WorkspaceConfig::default())
    }

    /// Creates the action with custom configuration.
    pub fn with_config(membership_repo: M, invitation_repo: I, config: WorkspaceConfig) -> Self {
        Self {
            access: AccessEvaluator::new(membership_repo),
            invitation_repo,
            config,
        }
    }

    /// Creates a pending invitation.
    ///
    /// # Returns
    ///
    /// - `Ok(invitation)` - created, status pending
    /// - `Err(WorkspaceError::Forbidden)` - inviter is not owner/admin
    /// - `Err(WorkspaceError::Validation(_))` - bad email or non-grantable role
    /// - `Err(WorkspaceError::AlreadyInvited)` - duplicate pending invitation
    ///   (only when `enforce_unique_pending` is on)
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_invitation", skip_all, err)
    )]
    pub async fn execute(
        &self,
        input: CreateInvitationInput,
    ) -> Result<WorkspaceInvitation, WorkspaceError> {
        let email = input.email.trim().to_lowercase();
        validate_email(&email)?;

        // Ownership moves through explicit transfer, never through an invite.
        if input.role == Role::Owner {
            return Err(ValidationError::OwnerNotAssignable.into());
        }

        self.access
            .require_manager(input.inviter_id, input.workspace_id)
            .await?;

        if self.config.enforce_unique_pending
            && self
                .invitation_repo
                .has_pending(input.workspace_id, &email)
                .await?
        {
            return Err(WorkspaceError::AlreadyInvited);
        }

        let expires_at = Utc::now() + self.config.invitation_expiry;

        let invitation = self
            .invitation_repo
            .create(CreateInvitation {
                workspace_id: input.workspace_id,
                email,
                role: input.role,
                invited_by: input.inviter_id,
                invited_by_email: input.inviter_email,
                expires_at,
            })
            .await?;

        log::info!(
            target: "anteroom",
            "msg=\"invitation created\", workspace_id={}, invitation_id={}, email=\"{}\", role=\"{}\"",
            invitation.workspace_id,
            invitation.id,
            invitation.email,
            invitation.role.as_str()
        );

        Ok(invitation)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::workspaces::{
        CreateMembership, InvitationStatus, MockInvitationRepository, MockMembershipRepository,
        MockWorkspaceRepository,
    };

    async fn setup() -> (MockMembershipRepository, MockInvitationRepository) {
        let workspaces = MockWorkspaceRepository::new();
        let memberships = MockMembershipRepository::new();
        let invitations = MockInvitationRepository::new(workspaces, memberships.clone());

        memberships
            .upsert(CreateMembership {
                workspace_id: 1,
                user_id: 1,
                role: Role::Admin,
            })
            .await
            .unwrap();
        memberships
            .upsert(CreateMembership {
                workspace_id: 1,
                user_id: 2,
                role: Role::Member,
            })
            .await
            .unwrap();

        (memberships, invitations)
    }

    fn input(inviter_id: i64, email: &str, role: Role) -> CreateInvitationInput {
        CreateInvitationInput {
            workspace_id: 1,
            inviter_id,
            inviter_email: "admin@example.com".to_owned(),
            email: email.to_owned(),
            role,
        }
    }

    #[tokio::test]
    async fn test_admin_can_invite() {
        let (memberships, invitations) = setup().await;
        let action = CreateInvitationAction::new(memberships, invitations);

        let invitation = action
            .execute(input(1, "invitee@example.com", Role::Member))
            .await
            .unwrap();

        assert_eq!(invitation.email, "invitee@example.com");
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.invited_by, 1);

        let expected = Utc::now() + Duration::days(7);
        let diff = (invitation.expires_at - expected).num_seconds().abs();
        assert!(diff < 5, "expiry should default to ~7 days from now");
    }

    #[tokio::test]
    async fn test_member_cannot_invite() {
        let (memberships, invitations) = setup().await;
        let action = CreateInvitationAction::new(memberships, invitations);

        let err = action
            .execute(input(2, "invitee@example.com", Role::Member))
            .await
            .unwrap_err();
        assert_eq!(err, WorkspaceError::Forbidden);
    }

    #[tokio::test]
    async fn test_outsider_cannot_invite() {
        let (memberships, invitations) = setup().await;
        let action = CreateInvitationAction::new(memberships, invitations);

        let err = action
            .execute(input(99, "invitee@example.com", Role::Member))
            .await
            .unwrap_err();
        assert_eq!(err, WorkspaceError::Forbidden);
    }

    #[tokio::test]
    async fn test_email_is_normalized_to_lowercase() {
        let (memberships, invitations) = setup().await;
        let action = CreateInvitationAction::new(memberships, invitations);

        let invitation = action
            .execute(input(1, "DAVE@X.COM", Role::Admin))
            .await
            .unwrap();
        assert_eq!(invitation.email, "dave@x.com");
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_before_storage() {
        let (memberships, invitations) = setup().await;
        let action = CreateInvitationAction::new(memberships, invitations);

        let err = action.execute(input(1, "notanemail", Role::Member)).await;
        assert!(matches!(
            err.unwrap_err(),
            WorkspaceError::Validation(ValidationError::EmailInvalidFormat)
        ));
    }

    #[tokio::test]
    async fn test_owner_role_not_grantable() {
        let (memberships, invitations) = setup().await;
        let action = CreateInvitationAction::new(memberships, invitations);

        let err = action
            .execute(input(1, "invitee@example.com", Role::Owner))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WorkspaceError::Validation(ValidationError::OwnerNotAssignable)
        );
    }

    #[tokio::test]
    async fn test_duplicate_pending_rejected() {
        let (memberships, invitations) = setup().await;
        let action = CreateInvitationAction::new(memberships, invitations);

        action
            .execute(input(1, "invitee@example.com", Role::Member))
            .await
            .unwrap();
        // same address, different casing
        let err = action
            .execute(input(1, "Invitee@Example.Com", Role::Member))
            .await
            .unwrap_err();
        assert_eq!(err, WorkspaceError::AlreadyInvited);
    }

    #[tokio::test]
    async fn test_duplicate_allowed_when_enforcement_off() {
        let (memberships, invitations) = setup().await;
        let config = WorkspaceConfig {
            enforce_unique_pending: false,
            ..WorkspaceConfig::default()
        };
        let action = CreateInvitationAction::with_config(memberships, invitations, config);

        action
            .execute(input(1, "invitee@example.com", Role::Member))
            .await
            .unwrap();
        assert!(action
            .execute(input(1, "invitee@example.com", Role::Member))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_custom_expiry() {
        let (memberships, invitations) = setup().await;
        let config = WorkspaceConfig {
            invitation_expiry: Duration::days(14),
            ..WorkspaceConfig::default()
        };
        let action = CreateInvitationAction::with_config(memberships, invitations, config);

        let invitation = action
            .execute(input(1, "invitee@example.com", Role::Member))
            .await
            .unwrap();

        let expected = Utc::now() + Duration::days(14);
        let diff = (invitation.expires_at - expected).num_seconds().abs();
        assert!(diff < 5, "expiry should be ~14 days from now");
    }
}
