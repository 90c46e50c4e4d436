//! Service layer: the invitation lifecycle and its external collaborators.

pub mod email;
pub mod invitation;

pub use email::EmailService;
pub use invitation::{InvitationError, InvitationService};
