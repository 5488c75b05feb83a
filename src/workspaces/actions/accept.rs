use crate::workspaces::{InvitationRepository, WorkspaceMember};
use crate::WorkspaceError;

/// Action to accept a pending invitation.
///
/// The caller is the authenticated invitee: the invitation's email must
/// match the session email (case-insensitive). On success the user becomes
/// a member with the invitation's granted role and the invitation flips to
/// accepted; both writes happen in one transaction inside the repository,
/// so a concurrent decline or cancel loses cleanly.
pub struct AcceptInvitationAction<I>
where
    I: InvitationRepository,
{
    invitation_repo: I,
}

impl<I: InvitationRepository> AcceptInvitationAction<I> {
    pub fn new(invitation_repo: I) -> Self {
        Self { invitation_repo }
    }

    /// Accepts the invitation on behalf of the authenticated user.
    ///
    /// # Returns
    ///
    /// - `Ok(membership)` - user added to the workspace
    /// - `Err(WorkspaceError::NotFound)` - no such invitation
    /// - `Err(WorkspaceError::EmailMismatch)` - invitation is for another address
    /// - `Err(WorkspaceError::Expired)` - past the expiry horizon
    /// - `Err(WorkspaceError::NotPending)` - already terminal, or lost a race
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "accept_invitation", skip(self, user_email), err)
    )]
    pub async fn execute(
        &self,
        invitation_id: i64,
        user_id: i64,
        user_email: &str,
    ) -> Result<WorkspaceMember, WorkspaceError> {
        let invitation = self
            .invitation_repo
            .find_by_id(invitation_id)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        // Email ownership before state: a mismatched caller learns nothing
        // about the invitation's lifecycle.
        if !invitation.matches_email(user_email) {
            return Err(WorkspaceError::EmailMismatch);
        }

        if !invitation.is_pending() {
            return Err(WorkspaceError::NotPending);
        }

        if invitation.is_expired() {
            return Err(WorkspaceError::Expired);
        }

        // The repository re-checks PENDING inside the transaction; the check
        // above is a fast path, not the race guard.
        let (invitation, membership) = self.invitation_repo.accept(invitation_id, user_id).await?;

        log::info!(
            target: "anteroom",
            "msg=\"invitation accepted\", workspace_id={}, invitation_id={}, user_id={}, role=\"{}\"",
            invitation.workspace_id,
            invitation.id,
            membership.user_id,
            membership.role.as_str()
        );

        Ok(membership)
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

    struct Fixture {
        memberships: MockMembershipRepository,
        invitations: MockInvitationRepository,
    }

    async fn setup() -> Fixture {
        let workspaces = MockWorkspaceRepository::new();
        let memberships = MockMembershipRepository::new();
        let invitations = MockInvitationRepository::new(workspaces, memberships.clone());
        Fixture {
            memberships,
            invitations,
        }
    }

    async fn seed_invitation(
        fixture: &Fixture,
        email: &str,
        expires_at: chrono::DateTime<Utc>,
    ) -> i64 {
        fixture
            .invitations
            .create(CreateInvitation {
                workspace_id: 1,
                email: email.to_owned(),
                role: Role::Member,
                invited_by: 1,
                invited_by_email: "owner@example.com".to_owned(),
                expires_at,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_accept_success() {
        let fixture = setup().await;
        let id = seed_invitation(
            &fixture,
            "carol@x.com",
            Utc::now() + Duration::days(7),
        )
        .await;

        let action = AcceptInvitationAction::new(fixture.invitations.clone());
        let membership = action.execute(id, 42, "carol@x.com").await.unwrap();

        assert_eq!(membership.workspace_id, 1);
        assert_eq!(membership.user_id, 42);
        assert_eq!(membership.role, Role::Member);

        let invitation = fixture.invitations.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(invitation.status, InvitationStatus::Accepted);

        let row = fixture
            .memberships
            .find_by_workspace_and_user(1, 42)
            .await
            .unwrap();
        assert!(row.is_some());
    }

    #[tokio::test]
    async fn test_accept_matches_email_case_insensitively() {
        let fixture = setup().await;
        let id = seed_invitation(
            &fixture,
            "dave@x.com",
            Utc::now() + Duration::days(7),
        )
        .await;

        let action = AcceptInvitationAction::new(fixture.invitations.clone());
        assert!(action.execute(id, 5, "DAVE@X.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_accept_not_found() {
        let fixture = setup().await;
        let action = AcceptInvitationAction::new(fixture.invitations.clone());

        let err = action.execute(999, 42, "carol@x.com").await.unwrap_err();
        assert_eq!(err, WorkspaceError::NotFound);
    }

    #[tokio::test]
    async fn test_accept_wrong_email_is_forbidden_not_missing() {
        let fixture = setup().await;
        let id = seed_invitation(
            &fixture,
            "alice@x.com",
            Utc::now() + Duration::days(7),
        )
        .await;

        let action = AcceptInvitationAction::new(fixture.invitations.clone());
        let err = action.execute(id, 42, "bob@x.com").await.unwrap_err();
        assert_eq!(err, WorkspaceError::EmailMismatch);
    }

    #[tokio::test]
    async fn test_accept_expired() {
        let fixture = setup().await;
        let id = seed_invitation(
            &fixture,
            "carol@x.com",
            Utc::now() - Duration::hours(1),
        )
        .await;

        let action = AcceptInvitationAction::new(fixture.invitations.clone());
        let err = action.execute(id, 42, "carol@x.com").await.unwrap_err();
        assert_eq!(err, WorkspaceError::Expired);
    }

    #[tokio::test]
    async fn test_accept_twice_conflicts() {
        let fixture = setup().await;
        let id = seed_invitation(
            &fixture,
            "carol@x.com",
            Utc::now() + Duration::days(7),
        )
        .await;

        let action = AcceptInvitationAction::new(fixture.invitations.clone());
        action.execute(id, 42, "carol@x.com").await.unwrap();

        let err = action.execute(id, 42, "carol@x.com").await.unwrap_err();
        assert_eq!(err, WorkspaceError::NotPending);
    }
}
