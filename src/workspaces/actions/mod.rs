mod accept;
mod cancel;
mod decline;
mod invite;
mod members;

pub use accept::AcceptInvitationAction;
pub use cancel::CancelInvitationAction;
pub use decline::DeclineInvitationAction;
pub use invite::{CreateInvitationAction, CreateInvitationInput};
pub use members::{ChangeRoleAction, RemoveMemberAction};
