//! Invitation request/response DTOs.
//!
//! Field presence is validated by the invitation service rather than by
//! serde so that a missing field produces the documented 400 body instead
//! of a deserialization rejection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invitation rows older than this are expired regardless of the token's
/// own embedded expiry. The two checks are deliberately independent.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Role id as presented by clients: either a JSON number or a numeric
/// string. Anything else is a format error.
///
/// The float arm exists so a fractional number still deserializes and is
/// then rejected by `to_i32` with the documented format error, instead of
/// failing body extraction outright.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoleIdParam {
    Number(i64),
    Fractional(f64),
    Text(String),
}

impl RoleIdParam {
    /// Parses the role id into an integer key, if well-formed.
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            RoleIdParam::Number(n) => i32::try_from(*n).ok(),
            RoleIdParam::Fractional(_) => None,
            RoleIdParam::Text(s) => s.trim().parse::<i32>().ok(),
        }
    }
}

/// Request body for issuing an invitation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueInvitationRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<RoleIdParam>,
    pub tenant_id: Option<Uuid>,
}

/// Request body for accepting an invitation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// Confirmation-only response body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
