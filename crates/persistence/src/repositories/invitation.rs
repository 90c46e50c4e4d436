//! Repository for invitation database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::InvitationEntity;
use crate::metrics::QueryTimer;

const INVITATION_COLUMNS: &str =
    "id, token, user_id, user_role_id, tenant_id, created_at, accepted_at";

/// Repository for invitation operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new invitation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds an invitation by its id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_id");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks an invitation as accepted.
    ///
    /// Conditional on `accepted_at IS NULL`; once set, `accepted_at` is
    /// immutable. Returns `true` if this call consumed the invitation.
    pub async fn mark_accepted(&self, invitation_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_invitation_accepted");
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET accepted_at = NOW()
            WHERE id = $1 AND accepted_at IS NULL
            "#,
        )
        .bind(invitation_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
