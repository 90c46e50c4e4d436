//! Notification dispatch abstraction.
//!
//! The invitation workflow sends two transactional emails: the invitation
//! itself (required for the issue operation to report success) and a
//! one-time welcome email on acceptance (best-effort). The dispatcher is a
//! trait so handlers can be exercised with a recording fake in tests.

/// Payload for an invitation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationEmail {
    /// Recipient email address
    pub to: String,
    /// Invitee first name
    pub first_name: String,
    /// Human-readable label of the role being granted
    pub role_label: String,
    /// Full acceptance URL including the signed token
    pub accept_url: String,
    /// Days until the invitation expires, for the message body
    pub expires_in_days: i64,
}

/// Payload for a welcome email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeEmail {
    /// Recipient email address
    pub to: String,
    /// New member first name
    pub first_name: String,
    /// Link to the portal sign-in page
    pub portal_url: String,
}

/// Result of a notification send attempt.
#[derive(Debug, Clone)]
pub enum NotificationResult {
    /// Notification was handed to the provider successfully.
    Sent,
    /// Notification sending failed.
    Failed(String),
    /// Notification was skipped (e.g., email sending disabled).
    Skipped,
}

impl NotificationResult {
    /// Whether the attempt counts as delivered for one-time-send tracking.
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationResult::Sent)
    }
}

/// Dispatcher for invitation-workflow notifications.
#[async_trait::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Send the invitation email with the acceptance link.
    async fn send_invitation(&self, email: InvitationEmail) -> NotificationResult;

    /// Send the one-time welcome email after acceptance.
    async fn send_welcome(&self, email: WelcomeEmail) -> NotificationResult;
}
