//! Role tags for portal access.
//!
//! Role names are persisted as strings on role-type descriptor rows.
//! Conversion back into the closed variant set is checked: an unknown
//! stored name is a data-integrity failure and is rejected explicitly
//! rather than coerced.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error raised when a stored role name is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role name: {0}")]
pub struct RoleParseError(pub String);

/// Closed set of roles granted through invitations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    TenantAdmin,
    User,
}

impl Role {
    /// Stored/wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::TenantAdmin => "tenant-admin",
            Role::User => "user",
        }
    }

    /// Human-readable label used in notifications.
    pub fn display_label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::TenantAdmin => "Tenant Admin",
            Role::User => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Role::SuperAdmin),
            "tenant-admin" => Ok(Role::TenantAdmin),
            "user" => Ok(Role::User),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}
