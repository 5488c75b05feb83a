//! The access evaluator consulted before every workspace-mutating operation.

use super::repository::MembershipRepository;
use super::types::Role;
use crate::WorkspaceError;

/// Resolves a user's effective role in a workspace and gates operations
/// on it.
///
/// A missing membership and a nonexistent workspace both come back as "no
/// role": dependent checks treat them uniformly as lack of access, so an
/// outsider probing workspace ids learns nothing about which ones exist.
pub struct AccessEvaluator<M>
where
    M: MembershipRepository,
{
    membership_repo: M,
}

impl<M: MembershipRepository> AccessEvaluator<M> {
    pub fn new(membership_repo: M) -> Self {
        Self { membership_repo }
    }

    /// The user's role in the workspace, or `None` for non-members.
    pub async fn role_of(
        &self,
        user_id: i64,
        workspace_id: i64,
    ) -> Result<Option<Role>, WorkspaceError> {
        let membership = self
            .membership_repo
            .find_by_workspace_and_user(workspace_id, user_id)
            .await?;
        Ok(membership.map(|m| m.role))
    }

    /// Fails with [`WorkspaceError::Forbidden`] unless the user holds one of
    /// `allowed` in the workspace. Returns the effective role on success.
    pub async fn require_role(
        &self,
        user_id: i64,
        workspace_id: i64,
        allowed: &[Role],
    ) -> Result<Role, WorkspaceError> {
        match self.role_of(user_id, workspace_id).await? {
            Some(role) if allowed.contains(&role) => Ok(role),
            _ => Err(WorkspaceError::Forbidden),
        }
    }

    /// Requires a role that can manage members (owner or admin).
    pub async fn require_manager(
        &self,
        user_id: i64,
        workspace_id: i64,
    ) -> Result<Role, WorkspaceError> {
        match self.role_of(user_id, workspace_id).await? {
            Some(role) if role.can_manage_members() => Ok(role),
            _ => Err(WorkspaceError::Forbidden),
        }
    }

    /// Requires any membership at all.
    pub async fn require_member(
        &self,
        user_id: i64,
        workspace_id: i64,
    ) -> Result<Role, WorkspaceError> {
        self.role_of(user_id, workspace_id)
            .await?
            .ok_or(WorkspaceError::Forbidden)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::workspaces::{CreateMembership, MockMembershipRepository};

    async fn seed_member(repo: &MockMembershipRepository, user_id: i64, role: Role) {
        repo.upsert(CreateMembership {
            workspace_id: 1,
            user_id,
            role,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_role_of_member_and_outsider() {
        let repo = MockMembershipRepository::new();
        seed_member(&repo, 1, Role::Owner).await;

        let access = AccessEvaluator::new(repo);
        assert_eq!(access.role_of(1, 1).await.unwrap(), Some(Role::Owner));
        assert_eq!(access.role_of(2, 1).await.unwrap(), None);
        // nonexistent workspace is indistinguishable from non-membership
        assert_eq!(access.role_of(1, 99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_require_manager() {
        let repo = MockMembershipRepository::new();
        seed_member(&repo, 1, Role::Admin).await;
        seed_member(&repo, 2, Role::Member).await;

        let access = AccessEvaluator::new(repo);
        assert_eq!(access.require_manager(1, 1).await.unwrap(), Role::Admin);
        assert_eq!(
            access.require_manager(2, 1).await.unwrap_err(),
            WorkspaceError::Forbidden
        );
        assert_eq!(
            access.require_manager(3, 1).await.unwrap_err(),
            WorkspaceError::Forbidden
        );
    }

    #[tokio::test]
    async fn test_require_role_exact_set() {
        let repo = MockMembershipRepository::new();
        seed_member(&repo, 1, Role::Member).await;

        let access = AccessEvaluator::new(repo);
        assert!(access.require_role(1, 1, &[Role::Member]).await.is_ok());
        assert_eq!(
            access
                .require_role(1, 1, &[Role::Owner, Role::Admin])
                .await
                .unwrap_err(),
            WorkspaceError::Forbidden
        );
    }
}
