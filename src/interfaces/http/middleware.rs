//! Bearer credential extraction
//!
//! [`BearerToken`] only pulls the raw token out of the `Authorization`
//! header. Verifying it is the handler's job, through the `Authorizer`.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::domain::DomainError;
use crate::interfaces::http::common::ApiError;

/// Raw token presented as `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

fn extract_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_token)
            .ok_or_else(|| ApiError::from(DomainError::Unauthorized("Not authenticated".into())))?;

        Ok(BearerToken(token.to_string()))
    }
}
