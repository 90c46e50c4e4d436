//! Injectable persistence client for the invitation workflow.
//!
//! Handlers receive the store through application state instead of
//! constructing a module-level client, so tests can substitute an
//! in-memory implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{InvitationEntity, UserEntity, UserRoleTypeEntity};
use crate::repositories::{
    InvitationRepository, NewInvitedUser, UserRepository, UserRoleTypeRepository,
};

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The users.email unique constraint fired. The application-level
    /// existence check is only an optimization; this is the real safety
    /// net for concurrent issues against the same email.
    #[error("A user already exists for this email")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Parameters for creating an invitation row.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_role_id: i32,
    pub tenant_id: Option<Uuid>,
}

/// Persistence operations needed by the invitation lifecycle.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError>;

    async fn find_role_type(&self, role_id: i32)
        -> Result<Option<UserRoleTypeEntity>, StoreError>;

    /// Create the placeholder user and its invitation, then attach the
    /// signed token, all in one transaction. The token is attached in a
    /// second write because it embeds the invitation's own id, but a
    /// failure mid-sequence must not leave an orphaned inactive user.
    async fn create_invitation(
        &self,
        user: NewInvitedUser,
        invitation: NewInvitation,
        token: &str,
    ) -> Result<(), StoreError>;

    async fn find_invitation(&self, id: Uuid) -> Result<Option<InvitationEntity>, StoreError>;

    /// Conditionally activate the user; `false` means another accept won.
    async fn activate_user(&self, user_id: Uuid, password_hash: &str)
        -> Result<bool, StoreError>;

    /// Conditionally consume the invitation; `false` means already consumed.
    async fn mark_invitation_accepted(&self, invitation_id: Uuid) -> Result<bool, StoreError>;

    async fn mark_welcome_sent(&self, user_id: Uuid) -> Result<(), StoreError>;
}

/// Postgres-backed store delegating to the repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    users: UserRepository,
    invitations: InvitationRepository,
    role_types: UserRoleTypeRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            role_types: UserRoleTypeRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl InvitationStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        Ok(self.users.find_by_email(email).await?)
    }

    async fn find_role_type(
        &self,
        role_id: i32,
    ) -> Result<Option<UserRoleTypeEntity>, StoreError> {
        Ok(self.role_types.find_by_id(role_id).await?)
    }

    async fn create_invitation(
        &self,
        user: NewInvitedUser,
        invitation: NewInvitation,
        token: &str,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, roles,
                               is_activated, welcome_email_sent, profile_image_url)
            VALUES ($1, $2, $3, $4, NULL, $5, false, false, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.roles)
        .bind(&user.profile_image_url)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        sqlx::query(
            r#"
            INSERT INTO invitations (id, token, user_id, user_role_id, tenant_id)
            VALUES ($1, NULL, $2, $3, $4)
            "#,
        )
        .bind(invitation.id)
        .bind(invitation.user_id)
        .bind(invitation.user_role_id)
        .bind(invitation.tenant_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE invitations SET token = $2 WHERE id = $1")
            .bind(invitation.id)
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_invitation(&self, id: Uuid) -> Result<Option<InvitationEntity>, StoreError> {
        Ok(self.invitations.find_by_id(id).await?)
    }

    async fn activate_user(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.users.activate(user_id, password_hash).await?)
    }

    async fn mark_invitation_accepted(&self, invitation_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.invitations.mark_accepted(invitation_id).await?)
    }

    async fn mark_welcome_sent(&self, user_id: Uuid) -> Result<(), StoreError> {
        Ok(self.users.mark_welcome_sent(user_id).await?)
    }
}
