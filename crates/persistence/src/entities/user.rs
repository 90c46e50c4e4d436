//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>,
    pub roles: Vec<String>,
    pub is_activated: bool,
    pub welcome_email_sent: bool,
    pub profile_image_url: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            first_name: entity.first_name,
            last_name: entity.last_name,
            password_hash: entity.password_hash,
            roles: entity.roles,
            is_activated: entity.is_activated,
            welcome_email_sent: entity.welcome_email_sent,
            profile_image_url: entity.profile_image_url,
            email_verified_at: entity.email_verified_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invited_entity() -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: "invitee@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            password_hash: None,
            roles: vec!["user".to_string()],
            is_activated: false,
            welcome_email_sent: false,
            profile_image_url: Some("/images/default-avatar.png".to_string()),
            email_verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_into_domain_model() {
        let entity = invited_entity();
        let id = entity.id;
        let user: domain::models::User = entity.into();

        assert_eq!(user.id, id);
        assert_eq!(user.email, "invitee@example.com");
        assert!(!user.is_activated);
        assert!(!user.can_authenticate());
    }
}
