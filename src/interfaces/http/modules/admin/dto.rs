//! Admin user-management DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::identity::{NewUser, UserChanges};
use crate::domain::{Role, User};

/// User API representation. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            verified: u.verified,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    /// Accounts start unverified; completing a password reset verifies them
    #[serde(default)]
    pub verified: bool,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
            role: r.role,
            verified: r.verified,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CreateUserParams {
    /// Send a password-reset notification to the new user (default true)
    #[serde(default = "default_send_email")]
    pub send_email: bool,
}

fn default_send_email() -> bool {
    true
}

/// Update user request; omitted fields stay unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
            role: r.role,
            verified: r.verified,
        }
    }
}
