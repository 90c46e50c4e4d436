//! Invitation lifecycle orchestration.
//!
//! Issue: validate the request, create the placeholder user and invitation
//! in one transaction, then deliver the acceptance link. Accept: verify the
//! token, run the expiry and double-accept guards, set the password and
//! activate the account.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use domain::models::{AcceptInvitationRequest, IssueInvitationRequest};
use domain::services::notification::{
    InvitationEmail, NotificationDispatcher, NotificationResult, WelcomeEmail,
};
use persistence::repositories::NewInvitedUser;
use persistence::store::{InvitationStore, NewInvitation, StoreError};
use shared::invite_token::InviteTokenCodec;
use shared::password::{hash_activation_password, PasswordError};

/// Errors from the invitation workflow. Display strings on the client-fault
/// variants are the exact response messages.
#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("All fields are required.")]
    MissingFields,

    #[error("Invalid roleId format")]
    InvalidRoleId,

    #[error("Invalid role.")]
    UnknownRole,

    #[error("User already exists.")]
    DuplicateUser,

    #[error("Token and password are required.")]
    MissingCredentials,

    #[error("Invalid or expired token.")]
    InvalidToken,

    #[error("Invitation has expired.")]
    InvitationExpired,

    #[error("User has already accepted the invitation.")]
    AlreadyAccepted,

    #[error("User not found.")]
    UserNotFound,

    #[error("Invitation not found.")]
    InvitationNotFound,

    #[error("Failed to sign invitation token: {0}")]
    TokenSigning(#[from] shared::invite_token::InviteTokenError),

    #[error("Invalid acceptance link configuration: {0}")]
    AcceptUrl(String),

    #[error("Failed to send invitation email: {0}")]
    NotificationFailed(String),

    #[error("Stored role name is not in the known set: {0}")]
    CorruptRole(String),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] PasswordError),

    #[error("Password hashing task failed: {0}")]
    HashingTask(#[from] tokio::task::JoinError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<StoreError> for InvitationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => InvitationError::DuplicateUser,
            StoreError::Database(e) => InvitationError::Database(e),
        }
    }
}

/// Validated issue-request fields.
struct IssueFields {
    first_name: String,
    last_name: String,
    email: String,
    role_id: i32,
    tenant_id: Option<Uuid>,
}

/// Orchestrates the issue and accept operations.
pub struct InvitationService {
    store: Arc<dyn InvitationStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    codec: Arc<InviteTokenCodec>,
    settings: crate::config::InvitationConfig,
    welcome_timeout: Duration,
}

impl InvitationService {
    pub fn new(
        store: Arc<dyn InvitationStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        codec: Arc<InviteTokenCodec>,
        settings: crate::config::InvitationConfig,
        welcome_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            codec,
            settings,
            welcome_timeout,
        }
    }

    /// Issue an invitation: create the placeholder user and invitation rows
    /// and send the acceptance link.
    pub async fn issue(
        &self,
        request: IssueInvitationRequest,
    ) -> Result<(), InvitationError> {
        let fields = validate_issue_request(&request)?;

        if self
            .store
            .find_user_by_email(&fields.email)
            .await?
            .is_some()
        {
            return Err(InvitationError::DuplicateUser);
        }

        let role_type = self
            .store
            .find_role_type(fields.role_id)
            .await?
            .ok_or(InvitationError::UnknownRole)?;
        let role = role_type
            .role()
            .map_err(|e| InvitationError::CorruptRole(e.to_string()))?;

        let user_id = Uuid::new_v4();
        let invitation_id = Uuid::new_v4();
        let token = self.codec.sign(&fields.email, user_id, invitation_id)?;

        let user = NewInvitedUser {
            id: user_id,
            email: fields.email.clone(),
            first_name: fields.first_name.clone(),
            last_name: fields.last_name.clone(),
            roles: vec![role.as_str().to_string()],
            profile_image_url: self.settings.default_profile_image_url.clone(),
        };
        let invitation = NewInvitation {
            id: invitation_id,
            user_id,
            user_role_id: role_type.id,
            tenant_id: fields.tenant_id,
        };

        self.store.create_invitation(user, invitation, &token).await?;

        let accept_url = self.accept_url(&token, &fields)?;
        let email = InvitationEmail {
            to: fields.email.clone(),
            first_name: fields.first_name.clone(),
            role_label: role_type.display_label.clone(),
            accept_url,
            expires_in_days: self.settings.ttl_days,
        };
        if let NotificationResult::Failed(reason) = self.notifier.send_invitation(email).await {
            // The rows stay; re-issuing for the same email reports a
            // duplicate until the placeholder is cleaned up.
            return Err(InvitationError::NotificationFailed(reason));
        }

        info!(
            email = %fields.email,
            invitation_id = %invitation_id,
            role = role.as_str(),
            "Invitation issued"
        );
        Ok(())
    }

    /// Accept an invitation: verify the token, run the expiry and
    /// double-accept guards, set the password and activate the account.
    pub async fn accept(
        &self,
        request: AcceptInvitationRequest,
    ) -> Result<(), InvitationError> {
        let (token, password) = validate_accept_request(&request)?;

        let claims = self
            .codec
            .verify(token)
            .ok_or(InvitationError::InvalidToken)?;

        let user = self
            .store
            .find_user_by_email(&claims.email)
            .await?
            .ok_or(InvitationError::UserNotFound)?;
        let invitation = self
            .store
            .find_invitation(claims.invitation_id)
            .await?
            .ok_or(InvitationError::InvitationNotFound)?;

        // Row age is checked on top of the token's own expiry; either one
        // alone rejects the acceptance.
        if invitation.age_days() > self.settings.ttl_days {
            return Err(InvitationError::InvitationExpired);
        }

        if user.is_activated {
            return Err(InvitationError::AlreadyAccepted);
        }

        let password = password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_activation_password(&password)).await??;

        // Conditional update is the authoritative double-accept guard; the
        // is_activated check above only short-circuits the common case.
        let activated = self.store.activate_user(user.id, &password_hash).await?;
        if !activated {
            return Err(InvitationError::AlreadyAccepted);
        }

        let consumed = self.store.mark_invitation_accepted(invitation.id).await?;
        if !consumed {
            warn!(
                invitation_id = %invitation.id,
                "Invitation row already consumed after user activation"
            );
        }

        info!(user_id = %user.id, invitation_id = %invitation.id, "Invitation accepted");

        if !user.welcome_email_sent {
            self.send_welcome(user.id, &claims.email, &user.first_name)
                .await;
        }

        Ok(())
    }

    /// Best-effort welcome email. Failures and timeouts are logged and
    /// swallowed; the acceptance has already succeeded.
    async fn send_welcome(&self, user_id: Uuid, email: &str, first_name: &str) {
        let message = WelcomeEmail {
            to: email.to_string(),
            first_name: first_name.to_string(),
            portal_url: self.portal_url(),
        };

        match tokio::time::timeout(self.welcome_timeout, self.notifier.send_welcome(message)).await
        {
            Ok(NotificationResult::Sent) => {
                if let Err(e) = self.store.mark_welcome_sent(user_id).await {
                    warn!(user_id = %user_id, error = %e, "Failed to record welcome email flag");
                }
            }
            Ok(NotificationResult::Failed(reason)) => {
                warn!(user_id = %user_id, reason = %reason, "Welcome email failed");
            }
            Ok(NotificationResult::Skipped) => {}
            Err(_) => {
                warn!(user_id = %user_id, "Welcome email timed out");
            }
        }
    }

    fn accept_url(&self, token: &str, fields: &IssueFields) -> Result<String, InvitationError> {
        let mut url = Url::parse(&self.settings.client_base_url)
            .map_err(|e| InvitationError::AcceptUrl(e.to_string()))?;
        url.set_path(&self.settings.accept_path);
        url.query_pairs_mut()
            .append_pair("token", token)
            .append_pair("firstName", &fields.first_name)
            .append_pair("lastName", &fields.last_name)
            .append_pair("email", &fields.email);
        Ok(url.into())
    }

    fn portal_url(&self) -> String {
        match Url::parse(&self.settings.client_base_url) {
            Ok(mut url) => {
                url.set_path(&self.settings.portal_path);
                url.into()
            }
            Err(_) => self.settings.client_base_url.clone(),
        }
    }
}

/// Validate the issue request. A malformed roleId is reported as a format
/// error before missing-field detection, matching the response contract.
fn validate_issue_request(
    request: &IssueInvitationRequest,
) -> Result<IssueFields, InvitationError> {
    let role_id = match &request.role_id {
        Some(param) => Some(param.to_i32().ok_or(InvitationError::InvalidRoleId)?),
        None => None,
    };

    let first_name = non_empty(&request.first_name);
    let last_name = non_empty(&request.last_name);
    let email = non_empty(&request.email);

    match (first_name, last_name, email, role_id) {
        (Some(first_name), Some(last_name), Some(email), Some(role_id)) => Ok(IssueFields {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            role_id,
            tenant_id: request.tenant_id,
        }),
        _ => Err(InvitationError::MissingFields),
    }
}

fn validate_accept_request(
    request: &AcceptInvitationRequest,
) -> Result<(&str, &str), InvitationError> {
    match (non_empty(&request.token), non_empty(&request.password)) {
        (Some(token), Some(password)) => Ok((token, password)),
        _ => Err(InvitationError::MissingCredentials),
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
