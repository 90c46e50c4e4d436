//! User domain model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user account.
///
/// Users enter the system in an "invited" state: no usable credential and
/// `is_activated = false`. Only acceptance of their invitation sets a
/// credential and activates the account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub roles: Vec<String>,
    pub is_activated: bool,
    pub welcome_email_sent: bool,
    pub profile_image_url: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account can authenticate.
    ///
    /// An unactivated user never has a usable credential.
    pub fn can_authenticate(&self) -> bool {
        self.is_activated && self.password_hash.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
