mod access;
mod actions;
mod repository;
mod types;

pub use access::AccessEvaluator;
pub use actions::{
    AcceptInvitationAction, CancelInvitationAction, ChangeRoleAction, CreateInvitationAction,
    CreateInvitationInput, DeclineInvitationAction, RemoveMemberAction,
};
pub use repository::{
    CreateInvitation, CreateMembership, CreateWorkspace, InvitationRepository,
    MembershipRepository, WorkspaceRepository,
};
pub use types::{
    InvitationStatus, PendingInvitation, Role, Workspace, WorkspaceInvitation, WorkspaceMember,
};

#[cfg(feature = "mocks")]
mod mocks;

#[cfg(feature = "mocks")]
pub use mocks::{MockInvitationRepository, MockMembershipRepository, MockWorkspaceRepository};
