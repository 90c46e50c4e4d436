//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Column list shared by the user queries.
const USER_COLUMNS: &str = "id, email, first_name, last_name, password_hash, roles, \
     is_activated, welcome_email_sent, profile_image_url, email_verified_at, \
     created_at, updated_at";

/// Parameters for creating a user in the invited state.
#[derive(Debug, Clone)]
pub struct NewInvitedUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub profile_image_url: String,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by email address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Activate an invited user, setting their credential exactly once.
    ///
    /// The update is conditional on `is_activated = false`: concurrent
    /// accepts race through the preceding read, and the zero-row case is
    /// how the loser learns it lost. Returns `true` if this call performed
    /// the activation.
    pub async fn activate(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("activate_user");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                is_activated = true,
                email_verified_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND is_activated = false
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Record that the one-time welcome email has been sent.
    pub async fn mark_welcome_sent(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_welcome_sent");
        sqlx::query(
            r#"
            UPDATE users
            SET welcome_email_sent = true, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }
}
