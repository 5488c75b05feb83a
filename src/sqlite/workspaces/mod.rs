mod invitation;
mod membership;
mod workspace;

pub use invitation::SqliteInvitationRepository;
pub use membership::SqliteMembershipRepository;
pub use workspace::SqliteWorkspaceRepository;
