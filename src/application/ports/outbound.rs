//! Outbound ports
//!
//! [`PasswordResetNotifier`] decouples the identity service from however a
//! reset link actually reaches the user. The default implementation only
//! logs; delivery over email is left to deployments that plug one in.

use async_trait::async_trait;

use crate::domain::DomainResult;

#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    /// Deliver `token` to the owner of `email`.
    async fn send_password_reset(&self, email: &str, token: &str) -> DomainResult<()>;
}
