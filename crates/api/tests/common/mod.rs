//! Common test utilities for integration tests.
//!
//! The invitation endpoints are exercised against an in-memory store and a
//! recording notifier, so these tests need no running database.

// Allow dead code in this module - these are helper utilities that may not be
// used by every integration test.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use chrono::{Duration, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use domain::services::notification::{
    InvitationEmail, NotificationDispatcher, NotificationResult, WelcomeEmail,
};
use persistence::entities::{InvitationEntity, UserEntity, UserRoleTypeEntity};
use persistence::repositories::NewInvitedUser;
use persistence::store::{InvitationStore, NewInvitation, StoreError};
use tenantbase_api::app::create_app_with_state;
use tenantbase_api::config::{
    Config, DatabaseConfig, EmailConfig, InvitationConfig, LoggingConfig, SecurityConfig,
    ServerConfig,
};

pub const TEST_TOKEN_SECRET: &str = "integration-test-secret";

/// Build a configuration for tests without touching the filesystem.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 60,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
        },
        invitation: InvitationConfig {
            token_secret: TEST_TOKEN_SECRET.to_string(),
            ttl_days: 7,
            client_base_url: "http://localhost:3000".to_string(),
            accept_path: "/accept-invitation".to_string(),
            portal_path: "/login".to_string(),
            default_profile_image_url: "/images/default-avatar.png".to_string(),
        },
        email: EmailConfig::default(),
    }
}

#[derive(Default)]
struct StoreInner {
    users: Vec<UserEntity>,
    invitations: Vec<InvitationEntity>,
}

/// In-memory store with the same conditional-update semantics as the
/// Postgres implementation.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
    fail_next: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with a database error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    pub fn user_by_email(&self, email: &str) -> Option<UserEntity> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn invitation_for_user(&self, user_id: Uuid) -> Option<InvitationEntity> {
        let inner = self.inner.lock().unwrap();
        inner
            .invitations
            .iter()
            .find(|i| i.user_id == user_id)
            .cloned()
    }

    /// Age every invitation row by the given number of days.
    pub fn backdate_invitations(&self, days: i64) {
        let mut inner = self.inner.lock().unwrap();
        for invitation in &mut inner.invitations {
            invitation.created_at -= Duration::days(days);
        }
    }

    pub fn remove_user(&self, email: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .users
            .retain(|u| !u.email.eq_ignore_ascii_case(email));
    }

    pub fn remove_invitations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.invitations.clear();
    }

    fn seeded_role(role_id: i32) -> Option<UserRoleTypeEntity> {
        let (name, display_label) = match role_id {
            1 => ("super-admin", "Super Admin"),
            2 => ("tenant-admin", "Tenant Admin"),
            3 => ("user", "User"),
            _ => return None,
        };
        Some(UserRoleTypeEntity {
            id: role_id,
            name: name.to_string(),
            display_label: display_label.to_string(),
        })
    }
}

#[async_trait]
impl InvitationStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_failure()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        self.check_failure()?;
        Ok(self.user_by_email(email))
    }

    async fn find_role_type(
        &self,
        role_id: i32,
    ) -> Result<Option<UserRoleTypeEntity>, StoreError> {
        self.check_failure()?;
        Ok(Self::seeded_role(role_id))
    }

    async fn create_invitation(
        &self,
        user: NewInvitedUser,
        invitation: NewInvitation,
        token: &str,
    ) -> Result<(), StoreError> {
        self.check_failure()?;
        let mut inner = self.inner.lock().unwrap();

        if inner
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        inner.users.push(UserEntity {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: None,
            roles: user.roles,
            is_activated: false,
            welcome_email_sent: false,
            profile_image_url: Some(user.profile_image_url),
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        });
        inner.invitations.push(InvitationEntity {
            id: invitation.id,
            token: Some(token.to_string()),
            user_id: invitation.user_id,
            user_role_id: invitation.user_role_id,
            tenant_id: invitation.tenant_id,
            created_at: now,
            accepted_at: None,
        });
        Ok(())
    }

    async fn find_invitation(&self, id: Uuid) -> Result<Option<InvitationEntity>, StoreError> {
        self.check_failure()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.invitations.iter().find(|i| i.id == id).cloned())
    }

    async fn activate_user(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        self.check_failure()?;
        let mut inner = self.inner.lock().unwrap();
        match inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id && !u.is_activated)
        {
            Some(user) => {
                user.password_hash = Some(password_hash.to_string());
                user.is_activated = true;
                user.email_verified_at = Some(Utc::now());
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_invitation_accepted(&self, invitation_id: Uuid) -> Result<bool, StoreError> {
        self.check_failure()?;
        let mut inner = self.inner.lock().unwrap();
        match inner
            .invitations
            .iter_mut()
            .find(|i| i.id == invitation_id && i.accepted_at.is_none())
        {
            Some(invitation) => {
                invitation.accepted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_welcome_sent(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.check_failure()?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.welcome_email_sent = true;
        }
        Ok(())
    }
}

/// Store wrapper that keeps serving a pre-activation snapshot of the user,
/// as if the lookup raced a concurrent activation. Every other call goes
/// straight to the wrapped store, so the conditional update is the only
/// guard left standing.
pub struct StaleUserReadStore {
    inner: Arc<InMemoryStore>,
}

impl StaleUserReadStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl InvitationStore for StaleUserReadStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        let user = self.inner.find_user_by_email(email).await?;
        Ok(user.map(|mut user| {
            user.is_activated = false;
            user.password_hash = None;
            user
        }))
    }

    async fn find_role_type(
        &self,
        role_id: i32,
    ) -> Result<Option<UserRoleTypeEntity>, StoreError> {
        self.inner.find_role_type(role_id).await
    }

    async fn create_invitation(
        &self,
        user: NewInvitedUser,
        invitation: NewInvitation,
        token: &str,
    ) -> Result<(), StoreError> {
        self.inner.create_invitation(user, invitation, token).await
    }

    async fn find_invitation(&self, id: Uuid) -> Result<Option<InvitationEntity>, StoreError> {
        self.inner.find_invitation(id).await
    }

    async fn activate_user(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        self.inner.activate_user(user_id, password_hash).await
    }

    async fn mark_invitation_accepted(&self, invitation_id: Uuid) -> Result<bool, StoreError> {
        self.inner.mark_invitation_accepted(invitation_id).await
    }

    async fn mark_welcome_sent(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.inner.mark_welcome_sent(user_id).await
    }
}

/// Notifier that records every payload and can be switched to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    invitations: Mutex<Vec<InvitationEmail>>,
    welcomes: Mutex<Vec<WelcomeEmail>>,
    fail_invitations: AtomicBool,
    fail_welcomes: AtomicBool,
    welcome_delay: Mutex<Option<std::time::Duration>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_invitations(&self) {
        self.fail_invitations.store(true, Ordering::SeqCst);
    }

    pub fn fail_welcomes(&self) {
        self.fail_welcomes.store(true, Ordering::SeqCst);
    }

    /// Make welcome deliveries hang for the given duration before recording.
    pub fn delay_welcomes(&self, delay: std::time::Duration) {
        *self.welcome_delay.lock().unwrap() = Some(delay);
    }

    pub fn sent_invitations(&self) -> Vec<InvitationEmail> {
        self.invitations.lock().unwrap().clone()
    }

    pub fn sent_welcomes(&self) -> Vec<WelcomeEmail> {
        self.welcomes.lock().unwrap().clone()
    }

    /// Token query parameter of the most recent invitation email.
    pub fn last_token(&self) -> Option<String> {
        let invitations = self.invitations.lock().unwrap();
        let accept_url = url::Url::parse(&invitations.last()?.accept_url).ok()?;
        accept_url
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn send_invitation(&self, email: InvitationEmail) -> NotificationResult {
        if self.fail_invitations.load(Ordering::SeqCst) {
            return NotificationResult::Failed("provider unavailable".to_string());
        }
        self.invitations.lock().unwrap().push(email);
        NotificationResult::Sent
    }

    async fn send_welcome(&self, email: WelcomeEmail) -> NotificationResult {
        let delay = *self.welcome_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_welcomes.load(Ordering::SeqCst) {
            return NotificationResult::Failed("provider unavailable".to_string());
        }
        self.welcomes.lock().unwrap().push(email);
        NotificationResult::Sent
    }
}

/// Everything an invitation test needs: the app plus handles to its fakes.
pub struct TestContext {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn build_test_app() -> TestContext {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let app = create_app_with_state(test_config(), store.clone(), notifier.clone());
    TestContext {
        app,
        store,
        notifier,
    }
}

/// Send a JSON request to the app.
pub async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request");

    app.clone()
        .oneshot(request)
        .await
        .expect("Request handling failed")
}

/// Parse a JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
