use crate::workspaces::{InvitationRepository, WorkspaceInvitation};
use crate::WorkspaceError;

/// Action to decline a pending invitation.
///
/// Guard checks mirror [`AcceptInvitationAction`]: only the authenticated
/// invitee may decline, only while the invitation is pending and unexpired.
/// Declining has no membership side effect.
///
/// [`AcceptInvitationAction`]: crate::workspaces::AcceptInvitationAction
pub struct DeclineInvitationAction<I>
where
    I: InvitationRepository,
{
    invitation_repo: I,
}

impl<I: InvitationRepository> DeclineInvitationAction<I> {
    pub fn new(invitation_repo: I) -> Self {
        Self { invitation_repo }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "decline_invitation", skip(self, user_email), err)
    )]
    pub async fn execute(
        &self,
        invitation_id: i64,
        user_email: &str,
    ) -> Result<WorkspaceInvitation, WorkspaceError> {
        let invitation = self
            .invitation_repo
            .find_by_id(invitation_id)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        if !invitation.matches_email(user_email) {
            return Err(WorkspaceError::EmailMismatch);
        }

        if !invitation.is_pending() {
            return Err(WorkspaceError::NotPending);
        }

        if invitation.is_expired() {
            return Err(WorkspaceError::Expired);
        }

        let invitation = self.invitation_repo.decline(invitation_id).await?;

        log::info!(
            target: "anteroom",
            "msg=\"invitation declined\", workspace_id={}, invitation_id={}",
            invitation.workspace_id,
            invitation.id
        );

        Ok(invitation)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::workspaces::{
        CreateInvitation, InvitationStatus, MembershipRepository, MockInvitationRepository,
        MockMembershipRepository, MockWorkspaceRepository, Role,
    };

    async fn setup() -> (MockMembershipRepository, MockInvitationRepository) {
        let workspaces = MockWorkspaceRepository::new();
        let memberships = MockMembershipRepository::new();
        let invitations = MockInvitationRepository::new(workspaces, memberships.clone());
        (memberships, invitations)
    }

    async fn seed_invitation(invitations: &MockInvitationRepository) -> i64 {
        invitations
            .create(CreateInvitation {
                workspace_id: 1,
                email: "carol@x.com".to_owned(),
                role: Role::Member,
                invited_by: 1,
                invited_by_email: "owner@example.com".to_owned(),
                expires_at: Utc::now() + Duration::days(7),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_decline_success_has_no_membership_side_effect() {
        let (memberships, invitations) = setup().await;
        let id = seed_invitation(&invitations).await;

        let action = DeclineInvitationAction::new(invitations.clone());
        let invitation = action.execute(id, "carol@x.com").await.unwrap();
        assert_eq!(invitation.status, InvitationStatus::Declined);

        let members = memberships.find_by_workspace(1).await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_decline_wrong_email() {
        let (_, invitations) = setup().await;
        let id = seed_invitation(&invitations).await;

        let action = DeclineInvitationAction::new(invitations);
        let err = action.execute(id, "mallory@x.com").await.unwrap_err();
        assert_eq!(err, WorkspaceError::EmailMismatch);
    }

    #[tokio::test]
    async fn test_decline_after_accept_conflicts() {
        let (_, invitations) = setup().await;
        let id = seed_invitation(&invitations).await;

        invitations.accept(id, 42).await.unwrap();

        let action = DeclineInvitationAction::new(invitations);
        let err = action.execute(id, "carol@x.com").await.unwrap_err();
        assert_eq!(err, WorkspaceError::NotPending);
    }
}
