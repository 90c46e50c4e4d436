//! Role-type descriptor entity (database row mapping).

use domain::models::{Role, RoleParseError};
use sqlx::FromRow;
use std::str::FromStr;

/// Database row mapping for the user_role_types table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleTypeEntity {
    pub id: i32,
    pub name: String,
    pub display_label: String,
}

impl UserRoleTypeEntity {
    /// Checked conversion of the stored role name into the closed role set.
    ///
    /// An unknown stored name is corrupt data and fails explicitly rather
    /// than being coerced to a default.
    pub fn role(&self) -> Result<Role, RoleParseError> {
        Role::from_str(&self.name)
    }
}
