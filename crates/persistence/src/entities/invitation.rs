//! Invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::INVITATION_TTL_DAYS;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the invitations table.
///
/// `token` is null between row creation and token attachment: the token
/// embeds the row's own generated id, so it cannot exist at insert time.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub token: Option<String>,
    pub user_id: Uuid,
    pub user_role_id: i32,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl InvitationEntity {
    /// Whether the row itself has aged out.
    ///
    /// This check is independent of the token's embedded expiry; both must
    /// hold for acceptance. Row age always governs, even for a
    /// hypothetically fresher token.
    pub fn is_expired(&self) -> bool {
        self.age_days() > INVITATION_TTL_DAYS
    }

    /// Whether this invitation has been consumed.
    pub fn is_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }

    /// Age of the invitation row in whole days.
    pub fn age_days(&self) -> i64 {
        (Utc::now() - self.created_at).num_days()
    }

    /// Whether the invitation can still be accepted.
    pub fn is_pending(&self) -> bool {
        !self.is_accepted() && !self.is_expired()
    }
}
