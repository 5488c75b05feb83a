use crate::workspaces::{AccessEvaluator, InvitationRepository, MembershipRepository};
use crate::WorkspaceError;

/// Action to cancel (hard-delete) a pending invitation.
///
/// The requester must hold owner or admin in the workspace named in the
/// request path. An invitation that exists but belongs to a different
/// workspace is reported as not found, never as belonging elsewhere.
pub struct CancelInvitationAction<M, I>
where
    M: MembershipRepository,
    I: InvitationRepository,
{
    access: AccessEvaluator<M>,
    invitation_repo: I,
}

impl<M, I> CancelInvitationAction<M, I>
where
    M: MembershipRepository,
    I: InvitationRepository,
{
    pub fn new(membership_repo: M, invitation_repo: I) -> Self {
        Self {
            access: AccessEvaluator::new(membership_repo),
            invitation_repo,
        }
    }

    /// # Returns
    ///
    /// - `Ok(())` - invitation deleted
    /// - `Err(WorkspaceError::Forbidden)` - requester is not owner/admin
    /// - `Err(WorkspaceError::NotFound)` - absent, or not in this workspace
    /// - `Err(WorkspaceError::NotPending)` - already terminal
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cancel_invitation", skip(self), err)
    )]
    pub async fn execute(
        &self,
        workspace_id: i64,
        invitation_id: i64,
        requester_id: i64,
    ) -> Result<(), WorkspaceError> {
        self.access
            .require_manager(requester_id, workspace_id)
            .await?;

        let invitation = self
            .invitation_repo
            .find_by_id(invitation_id)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        if invitation.workspace_id != workspace_id {
            return Err(WorkspaceError::NotFound);
        }

        self.invitation_repo.cancel(invitation_id).await?;

        log::info!(
            target: "anteroom",
            "msg=\"invitation cancelled\", workspace_id={workspace_id}, invitation_id={invitation_id}, requester_id={requester_id}"
        );

        Ok(())
    }
}
