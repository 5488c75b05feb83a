//! In-memory repository implementations for tests.
//!
//! State lives behind `Arc`s, so clones of a mock share storage. That lets
//! the same instance serve both as action input and as HTTP router state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::repository::{
    CreateInvitation, CreateMembership, CreateWorkspace, InvitationRepository,
    MembershipRepository, WorkspaceRepository,
};
use super::types::{
    InvitationStatus, PendingInvitation, Role, Workspace, WorkspaceInvitation, WorkspaceMember,
};
use crate::WorkspaceError;

fn poisoned() -> WorkspaceError {
    WorkspaceError::Internal("lock poisoned".into())
}

#[derive(Clone)]
pub struct MockWorkspaceRepository {
    workspaces: Arc<RwLock<HashMap<i64, Workspace>>>,
    next_id: Arc<AtomicI64>,
}

impl MockWorkspaceRepository {
    pub fn new() -> Self {
        Self {
            workspaces: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MockWorkspaceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceRepository for MockWorkspaceRepository {
    async fn create(&self, data: CreateWorkspace) -> Result<Workspace, WorkspaceError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let workspace = Workspace {
            id,
            name: data.name,
            description: data.description,
            created_at: now,
            updated_at: now,
        };

        let mut workspaces = self.workspaces.write().map_err(|_| poisoned())?;
        workspaces.insert(id, workspace.clone());

        Ok(workspace)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Workspace>, WorkspaceError> {
        let workspaces = self.workspaces.read().map_err(|_| poisoned())?;
        Ok(workspaces.get(&id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Workspace, WorkspaceError> {
        let mut workspaces = self.workspaces.write().map_err(|_| poisoned())?;

        let workspace = workspaces.get_mut(&id).ok_or(WorkspaceError::NotFound)?;

        if let Some(n) = name {
            n.clone_into(&mut workspace.name);
        }
        if let Some(d) = description {
            workspace.description = Some(d.to_owned());
        }
        workspace.updated_at = Utc::now();

        Ok(workspace.clone())
    }
}

#[derive(Clone)]
pub struct MockMembershipRepository {
    members: Arc<RwLock<HashMap<i64, WorkspaceMember>>>,
    next_id: Arc<AtomicI64>,
}

impl MockMembershipRepository {
    pub fn new() -> Self {
        Self {
            members: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MockMembershipRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipRepository for MockMembershipRepository {
    async fn upsert(&self, data: CreateMembership) -> Result<WorkspaceMember, WorkspaceError> {
        let mut members = self.members.write().map_err(|_| poisoned())?;
        let now = Utc::now();

        if let Some(existing) = members
            .values_mut()
            .find(|m| m.workspace_id == data.workspace_id && m.user_id == data.user_id)
        {
            existing.role = data.role;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let membership = WorkspaceMember {
            id,
            workspace_id: data.workspace_id,
            user_id: data.user_id,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        members.insert(id, membership.clone());

        Ok(membership)
    }

    async fn find_by_workspace_and_user(
        &self,
        workspace_id: i64,
        user_id: i64,
    ) -> Result<Option<WorkspaceMember>, WorkspaceError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        Ok(members
            .values()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_by_workspace(
        &self,
        workspace_id: i64,
    ) -> Result<Vec<WorkspaceMember>, WorkspaceError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        let mut rows: Vec<_> = members
            .values()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<WorkspaceMember>, WorkspaceError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        let mut rows: Vec<_> = members
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn update_role(
        &self,
        workspace_id: i64,
        user_id: i64,
        role: Role,
    ) -> Result<WorkspaceMember, WorkspaceError> {
        let mut members = self.members.write().map_err(|_| poisoned())?;

        let membership = members
            .values_mut()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .ok_or(WorkspaceError::NotFound)?;

        membership.role = role;
        membership.updated_at = Utc::now();

        Ok(membership.clone())
    }

    async fn delete(&self, workspace_id: i64, user_id: i64) -> Result<(), WorkspaceError> {
        let mut members = self.members.write().map_err(|_| poisoned())?;
        members.retain(|_, m| !(m.workspace_id == workspace_id && m.user_id == user_id));
        Ok(())
    }

    async fn count_owners(&self, workspace_id: i64) -> Result<i64, WorkspaceError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        Ok(members
            .values()
            .filter(|m| m.workspace_id == workspace_id && m.role == Role::Owner)
            .count() as i64)
    }
}

#[derive(Clone)]
pub struct MockInvitationRepository {
    invitations: Arc<RwLock<HashMap<i64, WorkspaceInvitation>>>,
    next_id: Arc<AtomicI64>,
    workspaces: MockWorkspaceRepository,
    memberships: MockMembershipRepository,
}

impl MockInvitationRepository {
    /// The invitation mock needs the workspace store (for the pending-list
    /// join) and the membership store (for the accept side effect).
    pub fn new(workspaces: MockWorkspaceRepository, memberships: MockMembershipRepository) -> Self {
        Self {
            invitations: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            workspaces,
            memberships,
        }
    }

    /// Flips the status of a pending row, returning the updated invitation.
    /// The write lock makes this the single decision point for races.
    fn transition(
        &self,
        id: i64,
        to: InvitationStatus,
    ) -> Result<WorkspaceInvitation, WorkspaceError> {
        let mut invitations = self.invitations.write().map_err(|_| poisoned())?;
        let invitation = invitations.get_mut(&id).ok_or(WorkspaceError::NotFound)?;
        if invitation.status != InvitationStatus::Pending {
            return Err(WorkspaceError::NotPending);
        }
        invitation.status = to;
        Ok(invitation.clone())
    }
}

#[async_trait]
impl InvitationRepository for MockInvitationRepository {
    async fn create(
        &self,
        data: CreateInvitation,
    ) -> Result<WorkspaceInvitation, WorkspaceError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let invitation = WorkspaceInvitation {
            id,
            workspace_id: data.workspace_id,
            email: data.email.to_lowercase(),
            role: data.role,
            invited_by: data.invited_by,
            invited_by_email: data.invited_by_email,
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };

        let mut invitations = self.invitations.write().map_err(|_| poisoned())?;
        invitations.insert(id, invitation.clone());

        Ok(invitation)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<WorkspaceInvitation>, WorkspaceError> {
        let invitations = self.invitations.read().map_err(|_| poisoned())?;
        Ok(invitations.get(&id).cloned())
    }

    async fn find_pending_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<PendingInvitation>, WorkspaceError> {
        let email = email.to_lowercase();
        let now = Utc::now();

        let mut rows: Vec<_> = {
            let invitations = self.invitations.read().map_err(|_| poisoned())?;
            invitations
                .values()
                .filter(|i| {
                    i.email == email
                        && i.status == InvitationStatus::Pending
                        && i.expires_at > now
                })
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut pending = Vec::with_capacity(rows.len());
        for invitation in rows {
            let workspace = self
                .workspaces
                .find_by_id(invitation.workspace_id)
                .await?
                .ok_or_else(|| {
                    WorkspaceError::DatabaseError(format!(
                        "workspace {} missing for invitation {}",
                        invitation.workspace_id, invitation.id
                    ))
                })?;
            pending.push(PendingInvitation {
                invitation,
                workspace_name: workspace.name,
            });
        }

        Ok(pending)
    }

    async fn find_pending_by_workspace(
        &self,
        workspace_id: i64,
    ) -> Result<Vec<WorkspaceInvitation>, WorkspaceError> {
        let now = Utc::now();
        let invitations = self.invitations.read().map_err(|_| poisoned())?;
        let mut rows: Vec<_> = invitations
            .values()
            .filter(|i| {
                i.workspace_id == workspace_id
                    && i.status == InvitationStatus::Pending
                    && i.expires_at > now
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn has_pending(
        &self,
        workspace_id: i64,
        email: &str,
    ) -> Result<bool, WorkspaceError> {
        let email = email.to_lowercase();
        let now = Utc::now();
        let invitations = self.invitations.read().map_err(|_| poisoned())?;
        Ok(invitations.values().any(|i| {
            i.workspace_id == workspace_id
                && i.email == email
                && i.status == InvitationStatus::Pending
                && i.expires_at > now
        }))
    }

    async fn accept(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<(WorkspaceInvitation, WorkspaceMember), WorkspaceError> {
        let invitation = self.transition(id, InvitationStatus::Accepted)?;

        let membership = self
            .memberships
            .upsert(CreateMembership {
                workspace_id: invitation.workspace_id,
                user_id,
                role: invitation.role,
            })
            .await?;

        Ok((invitation, membership))
    }

    async fn decline(&self, id: i64) -> Result<WorkspaceInvitation, WorkspaceError> {
        self.transition(id, InvitationStatus::Declined)
    }

    async fn cancel(&self, id: i64) -> Result<(), WorkspaceError> {
        let mut invitations = self.invitations.write().map_err(|_| poisoned())?;
        match invitations.get(&id) {
            None => Err(WorkspaceError::NotFound),
            Some(i) if i.status != InvitationStatus::Pending => Err(WorkspaceError::NotPending),
            Some(_) => {
                invitations.remove(&id);
                Ok(())
            }
        }
    }

    async fn delete_expired(&self) -> Result<u64, WorkspaceError> {
        let now = Utc::now();
        let mut invitations = self.invitations.write().map_err(|_| poisoned())?;
        let before = invitations.len();
        invitations.retain(|_, i| i.expires_at >= now);
        Ok((before - invitations.len()) as u64)
    }
}
