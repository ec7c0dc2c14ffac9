//! Request authorization
//!
//! Every protected handler calls [`Authorizer::authorize`] (or the
//! rate-limited variant) first and works with the returned identity.

use tracing::{info, warn};

use crate::domain::{DomainError, DomainResult, Role};
use crate::infrastructure::crypto::{DecodedToken, TokenCodec};
use crate::infrastructure::rate_limit::{RateDecision, SharedRateLimiter};

#[derive(Clone)]
pub struct Authorizer {
    codec: TokenCodec,
    limiter: SharedRateLimiter,
}

impl Authorizer {
    pub fn new(codec: TokenCodec, limiter: SharedRateLimiter) -> Self {
        Self { codec, limiter }
    }

    /// Verify the token and require every role in `required`.
    pub fn authorize(&self, token: &str, required: &[Role]) -> DomainResult<DecodedToken> {
        let decoded = self.codec.decode(token, required).map_err(|e| {
            warn!(error = %e, "Authorization rejected");
            DomainError::from(e)
        })?;

        info!(user_id = %decoded.id.simple(), scope = %decoded.scope, "Authorized");
        Ok(decoded)
    }

    /// [`authorize`](Self::authorize), then count the request against the
    /// caller's rate-limit window.
    pub fn authorize_limited(&self, token: &str, required: &[Role]) -> DomainResult<DecodedToken> {
        let decoded = self.authorize(token, required)?;

        match self.limiter.check(&decoded.id.simple().to_string()) {
            RateDecision::Allowed { .. } => Ok(decoded),
            RateDecision::Limited { retry_after } => {
                metrics::counter!("rate_limited_total").increment(1);
                warn!(user_id = %decoded.id.simple(), "Rate limit exceeded");
                Err(DomainError::RateLimited {
                    // Whole seconds, rounded up
                    retry_after_secs: retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0),
                })
            }
        }
    }
}
