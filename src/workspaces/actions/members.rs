//! Registry actions on membership rows: removal and role changes.
//!
//! Both enforce the sole-owner invariant: the last owner of a workspace can
//! be neither removed nor demoted.

use crate::validators::ValidationError;
use crate::workspaces::{AccessEvaluator, MembershipRepository, Role, WorkspaceMember};
use crate::WorkspaceError;

/// Action to remove a member from a workspace.
///
/// Owners and admins remove others; any member may remove themself
/// (leave). Removing an owner requires owner, and removing the only owner
/// is rejected.
pub struct RemoveMemberAction<M>
where
    M: MembershipRepository,
{
    membership_repo: M,
    access: AccessEvaluator<M>,
}

impl<M> RemoveMemberAction<M>
where
    M: MembershipRepository + Clone,
{
    pub fn new(membership_repo: M) -> Self {
        Self {
            access: AccessEvaluator::new(membership_repo.clone()),
            membership_repo,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "remove_member", skip(self), err)
    )]
    pub async fn execute(
        &self,
        workspace_id: i64,
        requester_id: i64,
        target_user_id: i64,
    ) -> Result<(), WorkspaceError> {
        let target = self
            .membership_repo
            .find_by_workspace_and_user(workspace_id, target_user_id)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        if requester_id == target_user_id {
            // leaving: no role requirement beyond being the member itself
        } else if target.role == Role::Owner {
            self.access
                .require_role(requester_id, workspace_id, &[Role::Owner])
                .await?;
        } else {
            self.access
                .require_manager(requester_id, workspace_id)
                .await?;
        }

        if target.role == Role::Owner
            && self.membership_repo.count_owners(workspace_id).await? <= 1
        {
            return Err(WorkspaceError::LastOwner);
        }

        self.membership_repo
            .delete(workspace_id, target_user_id)
            .await?;

        log::info!(
            target: "anteroom",
            "msg=\"member removed\", workspace_id={workspace_id}, user_id={target_user_id}, requester_id={requester_id}"
        );

        Ok(())
    }
}

/// Action to change a member's role.
///
/// Owners and admins change roles; changing an owner's role requires
/// owner. The owner role itself is never grantable here, and demoting the
/// only owner is rejected.
pub struct ChangeRoleAction<M>
where
    M: MembershipRepository,
{
    membership_repo: M,
    access: AccessEvaluator<M>,
}

impl<M> ChangeRoleAction<M>
where
    M: MembershipRepository + Clone,
{
    pub fn new(membership_repo: M) -> Self {
        Self {
            access: AccessEvaluator::new(membership_repo.clone()),
            membership_repo,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_role", skip(self), err)
    )]
    pub async fn execute(
        &self,
        workspace_id: i64,
        requester_id: i64,
        target_user_id: i64,
        new_role: Role,
    ) -> Result<WorkspaceMember, WorkspaceError> {
        if new_role == Role::Owner {
            return Err(ValidationError::OwnerNotAssignable.into());
        }

        let target = self
            .membership_repo
            .find_by_workspace_and_user(workspace_id, target_user_id)
            .await?
            .ok_or(WorkspaceError::NotFound)?;

        if target.role == Role::Owner {
            self.access
                .require_role(requester_id, workspace_id, &[Role::Owner])
                .await?;
            if self.membership_repo.count_owners(workspace_id).await? <= 1 {
                return Err(WorkspaceError::LastOwner);
            }
        } else {
            self.access
                .require_manager(requester_id, workspace_id)
                .await?;
        }

        let membership = self
            .membership_repo
            .update_role(workspace_id, target_user_id, new_role)
            .await?;

        log::info!(
            target: "anteroom",
            "msg=\"member role changed\", workspace_id={workspace_id}, user_id={target_user_id}, role=\"{}\"",
            new_role.as_str()
        );

        Ok(membership)
    }
}
