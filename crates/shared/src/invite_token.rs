//! Invitation token signing and verification.
//!
//! Invitation acceptance links carry a signed, time-limited token binding
//! the invitee's email, user id, and invitation id. Tokens are signed with
//! HS256 using a server-held secret; anything that fails verification is
//! treated uniformly as invalid.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default invitation token time-to-live: 7 days.
pub const DEFAULT_INVITE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Error type for token minting.
#[derive(Debug, Error)]
pub enum InviteTokenError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),
}

/// Claims carried by an invitation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteClaims {
    /// Invitee email address
    pub email: String,
    /// Placeholder user id created at issue time
    pub user_id: Uuid,
    /// Invitation row id
    pub invitation_id: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies invitation tokens.
#[derive(Clone)]
pub struct InviteTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for InviteTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteTokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl InviteTokenCodec {
    /// Creates a codec from a shared secret and token time-to-live.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Mints a signed invitation token for the given invitee.
    pub fn sign(
        &self,
        email: &str,
        user_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<String, InviteTokenError> {
        let now = Utc::now();
        let claims = InviteClaims {
            email: email.to_string(),
            user_id,
            invitation_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| InviteTokenError::EncodingError(e.to_string()))
    }

    /// Verifies a presented token.
    ///
    /// Returns `None` for a malformed token, a bad signature, or an expired
    /// token. Callers must treat all of these as "invalid or expired" and
    /// must not distinguish further.
    pub fn verify(&self, token: &str) -> Option<InviteClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Acceptance is a one-time high-value operation; no clock-skew leeway.
        validation.leeway = 0;

        decode::<InviteClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .ok()
    }
}
