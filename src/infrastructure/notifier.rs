//! Password-reset notifier that only writes to the log

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::PasswordResetNotifier;
use crate::domain::DomainResult;

/// Logs the reset event. The token itself is never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl PasswordResetNotifier for LogNotifier {
    async fn send_password_reset(&self, email: &str, token: &str) -> DomainResult<()> {
        info!(email, token_len = token.len(), "Password reset token ready for delivery");
        Ok(())
    }
}
