//! JSON body extractor that also runs `validator` rules
//!
//! Malformed JSON is a 400; a body that parses but breaks a field rule is a
//! 422 listing every failing field.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiError;
use crate::domain::DomainError;

pub struct ValidatedJson<T>(pub T);

/// "field: message" for every failing rule, sorted by field name.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, msg)
            })
        })
        .collect();
    messages.sort();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::from(DomainError::Validation(format!("Invalid JSON: {}", rejection)))
        })?;

        value
            .validate()
            .map_err(|errors| ApiError::Unprocessable(describe(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::Response;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(email)]
        email: String,
        #[validate(length(min = 8, message = "too short"))]
        password: String,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<Signup>) -> String {
        body.email
    }

    async fn send(body: &'static str) -> Response {
        Router::new()
            .route("/signup", post(handler))
            .oneshot(
                axum::http::Request::post("/signup")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_reaches_handler() {
        let resp = send(r#"{"email":"a@example.com","password":"long-enough"}"#).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let resp = send("{not json").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rule_violations_are_unprocessable() {
        let resp = send(r#"{"email":"nope","password":"short"}"#).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let error = json["error"].as_str().unwrap();
        assert!(error.contains("email: email"));
        assert!(error.contains("password: too short"));
    }
}
