//! User management service, the application-layer orchestration
//!
//! All user-related business logic lives here. HTTP handlers are thin
//! wrappers that authorize the caller and delegate to this service.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::ports::PasswordResetNotifier;
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, Role, UpdateUserDto, User, UserProfile,
    UserRepositoryInterface,
};
use crate::infrastructure::crypto::password::{hash_password_with_cost, verify_password};
use crate::infrastructure::crypto::TokenCodec;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const NOT_VERIFIED: &str = "User not verified. Request reset password.";

/// Access token handed back after a successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Input for creating a user. The password is plain text and gets hashed here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub verified: bool,
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

/// User service, which orchestrates all identity and user-management use-cases.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepositoryInterface> {
    repo: Arc<R>,
    codec: TokenCodec,
    notifier: Arc<dyn PasswordResetNotifier>,
    bcrypt_cost: u32,
}

impl<R: UserRepositoryInterface> UserService<R> {
    pub fn new(repo: Arc<R>, codec: TokenCodec, notifier: Arc<dyn PasswordResetNotifier>) -> Self {
        Self {
            repo,
            codec,
            notifier,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check an email/password pair.
    ///
    /// The verified flag is only consulted once the password matched, so a
    /// wrong password on an unverified account still reads as bad credentials.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            record_auth("unknown_user");
            debug!(email, "Login for unknown email");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if !self.verify(password, &user.password_hash).await? {
            record_auth("bad_password");
            debug!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        if !user.verified {
            record_auth("unverified");
            info!(user_id = %user.id, "Login refused for unverified user");
            return Err(DomainError::Forbidden(NOT_VERIFIED.into()));
        }

        record_auth("success");
        Ok(user)
    }

    /// Sign an access token carrying the scopes granted by the user's role.
    pub fn issue_token(&self, user: &User) -> DomainResult<IssuedToken> {
        let scope = user.role.granted_scopes();
        let access_token = self.codec.encode(user.id, &scope)?;

        info!(user_id = %user.id, scope = %scope, "Access token issued");
        Ok(IssuedToken {
            access_token,
            token_type: "bearer",
            expires_in: self.codec.config().access_ttl.num_seconds(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<IssuedToken> {
        let user = self.authenticate(email, password).await?;
        self.issue_token(&user)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn get_user(&self, id: Uuid) -> DomainResult<User> {
        self.repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))
    }

    /// User with posts (and their tags) and owned tags.
    pub async fn load_profile(&self, id: Uuid) -> DomainResult<UserProfile> {
        self.repo
            .load_profile(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Create a user. With `send_email`, a password-reset notification is
    /// dispatched in the background once the row exists.
    pub async fn create_user(&self, new_user: NewUser, send_email: bool) -> DomainResult<User> {
        let password_hash = self.hash(&new_user.password).await?;

        let user = self
            .repo
            .create_user(CreateUserDto {
                email: new_user.email,
                password_hash,
                role: new_user.role,
                verified: new_user.verified,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, role = %user.role, "User created");

        if send_email {
            self.spawn_reset_notification(&user);
        }
        Ok(user)
    }

    pub async fn update_user(&self, id: Uuid, changes: UserChanges) -> DomainResult<User> {
        let password_hash = match changes.password {
            Some(ref password) => Some(self.hash(password).await?),
            None => None,
        };

        let dto = UpdateUserDto {
            email: changes.email,
            password_hash,
            role: changes.role,
            verified: changes.verified,
        };

        let user = self
            .repo
            .update_user(id, dto)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;

        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: Uuid) -> DomainResult<()> {
        self.repo.delete_user(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create the bootstrap admin when no user exists yet.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> DomainResult<Option<User>> {
        if !self.repo.list_users().await?.is_empty() {
            return Ok(None);
        }

        let admin = self
            .create_user(
                NewUser {
                    email: email.to_string(),
                    password: password.to_string(),
                    role: Role::Admin,
                    verified: true,
                },
                false,
            )
            .await?;
        Ok(Some(admin))
    }

    // ── Password reset ──────────────────────────────────────────

    /// Issue a reset token for `email` and hand it to the notifier.
    ///
    /// Unknown addresses and notifier failures are not reported to the
    /// caller, so the outcome never reveals whether an account exists.
    pub async fn request_password_reset(&self, email: &str) -> DomainResult<()> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            debug!(email, "Password reset requested for unknown email");
            return Ok(());
        };

        if let Err(e) = deliver_reset(&self.codec, self.notifier.as_ref(), user.id, &user.email).await {
            warn!(user_id = %user.id, error = %e, "Password reset notification failed");
        }
        Ok(())
    }

    /// Set a new password from a reset token. Completing a reset also
    /// verifies the account.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> DomainResult<User> {
        let id = self.codec.decode_reset(token)?;
        let password_hash = self.hash(new_password).await?;

        let user = self
            .repo
            .update_user(
                id,
                UpdateUserDto {
                    password_hash: Some(password_hash),
                    verified: Some(true),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;

        info!(user_id = %user.id, "Password reset completed");
        Ok(user)
    }

    fn spawn_reset_notification(&self, user: &User) {
        let codec = self.codec.clone();
        let notifier = Arc::clone(&self.notifier);
        let id = user.id;
        let email = user.email.clone();

        tokio::spawn(async move {
            if let Err(e) = deliver_reset(&codec, notifier.as_ref(), id, &email).await {
                warn!(user_id = %id, error = %e, "Welcome reset notification failed");
            }
        });
    }

    // bcrypt runs on the blocking pool.

    async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| DomainError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))
    }

    async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| DomainError::Internal(format!("Verification task failed: {}", e)))
    }
}

async fn deliver_reset(
    codec: &TokenCodec,
    notifier: &dyn PasswordResetNotifier,
    id: Uuid,
    email: &str,
) -> DomainResult<()> {
    let token = codec.encode_reset(id)?;
    notifier.send_password_reset(email, &token).await?;
    info!(user_id = %id, "Password reset notification dispatched");
    Ok(())
}

fn record_auth(outcome: &'static str) {
    metrics::counter!("auth_attempts_total", "outcome" => outcome).increment(1);
}
