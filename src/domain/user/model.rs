use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::post::{Post, Tag};
use crate::domain::scope::ScopeSet;

/// Permission level of a user. Doubles as a token scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Scopes carried by a token issued to a user holding this role.
    pub fn granted_scopes(&self) -> ScopeSet {
        match self {
            Role::Admin => ScopeSet::from([Role::Admin, Role::User]),
            Role::User => ScopeSet::from([Role::User]),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with everything they own, loaded eagerly.
#[derive(Clone, Debug)]
pub struct UserProfile {
    pub user: User,
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
}
