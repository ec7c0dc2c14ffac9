//! Mapping from domain errors to HTTP responses

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::DomainError;

/// Handler error. Renders as the standard envelope.
#[derive(Debug)]
pub enum ApiError {
    /// Status derived from the domain error kind
    Domain(DomainError),
    /// Body parsed but broke field rules (422)
    Unprocessable(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        Self::Domain(DomainError::Validation(format!(
            "Invalid path parameter: {}",
            r.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        Self::Domain(DomainError::Validation(format!(
            "Invalid query string: {}",
            r.body_text()
        )))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let e = match self {
            ApiError::Domain(e) => e,
            ApiError::Unprocessable(_) => return StatusCode::UNPROCESSABLE_ENTITY,
        };
        match e {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            DomainError::Storage(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client. Server-side details stay in the log.
    fn public_message(&self) -> String {
        let e = match self {
            ApiError::Domain(e) => e,
            ApiError::Unprocessable(m) => return m.clone(),
        };
        match e {
            DomainError::Validation(m)
            | DomainError::Conflict(m)
            | DomainError::Unauthorized(m)
            | DomainError::Forbidden(m) => m.clone(),
            DomainError::NotFound { .. } => e.to_string(),
            DomainError::RateLimited { .. } => "Too many requests".to_string(),
            DomainError::Storage(_) | DomainError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Domain(ref e) = self {
            if status.is_server_error() {
                error!(error = %e, "Request failed");
            }
        }

        let body = Json(ApiResponse::<()>::error(self.public_message()));
        let mut response = (status, body).into_response();

        match self {
            ApiError::Domain(DomainError::Unauthorized(_)) => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            ApiError::Domain(DomainError::RateLimited { retry_after_secs }) => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            }
            _ => {}
        }

        response
    }
}
