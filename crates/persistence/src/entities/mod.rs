//! Entity definitions (database row mappings).

pub mod invitation;
pub mod user;
pub mod user_role_type;

pub use invitation::InvitationEntity;
pub use user::UserEntity;
pub use user_role_type::UserRoleTypeEntity;
