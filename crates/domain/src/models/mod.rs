//! Domain model definitions.

pub mod invitation;
pub mod role;
pub mod user;

pub use invitation::{
    AcceptInvitationRequest, IssueInvitationRequest, MessageResponse, RoleIdParam,
    INVITATION_TTL_DAYS,
};
pub use role::{Role, RoleParseError};
pub use user::User;
