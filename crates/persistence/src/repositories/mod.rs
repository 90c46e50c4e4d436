//! Repository implementations.

pub mod invitation;
pub mod user;
pub mod user_role_type;

pub use invitation::InvitationRepository;
pub use user::{NewInvitedUser, UserRepository};
pub use user_role_type::UserRoleTypeRepository;
