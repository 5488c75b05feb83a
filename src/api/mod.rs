//! HTTP API layers.
//!
//! Framework-agnostic request/response DTOs live here; the Axum wiring is
//! in [`axum`](crate::api::axum).

pub mod axum;
mod types;

pub use types::{
    CreateWorkspaceRequest, ErrorResponse, InvitationResponse, InviteMemberRequest,
    MembershipResponse, MessageResponse, PendingInvitationResponse, SuccessResponse,
    UpdateMemberRoleRequest, UpdateWorkspaceRequest, WorkspaceResponse,
};
