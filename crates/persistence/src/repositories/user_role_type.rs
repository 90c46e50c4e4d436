//! Repository for role-type descriptor lookups.

use sqlx::PgPool;

use crate::entities::UserRoleTypeEntity;
use crate::metrics::QueryTimer;

/// Repository for role-type descriptor operations.
#[derive(Clone)]
pub struct UserRoleTypeRepository {
    pool: PgPool,
}

impl UserRoleTypeRepository {
    /// Creates a new role-type repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a role-type descriptor by its integer key.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<UserRoleTypeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_role_type_by_id");
        let result = sqlx::query_as::<_, UserRoleTypeEntity>(
            r#"
            SELECT id, name, display_label
            FROM user_role_types
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
