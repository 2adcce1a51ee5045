//! Admin accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An admin account as stored. The password hash never leaves this type;
/// responses go through [`AdminProfile`].
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub super_admin: bool,
    pub avatar: Option<String>,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Admin {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Public view of the account, safe to serialize.
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            super_admin: self.super_admin,
            avatar: self.avatar.clone(),
            last_active_at: self.last_active_at,
            created_at: self.created_at,
        }
    }
}

/// Wire representation of an admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub super_admin: bool,
    pub avatar: Option<String>,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
