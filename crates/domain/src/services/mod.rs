//! Domain service abstractions.

pub mod notification;

pub use notification::{
    InvitationEmail, NotificationDispatcher, NotificationResult, WelcomeEmail,
};
