use super::Role;

/// Fields for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub verified: bool,
}
