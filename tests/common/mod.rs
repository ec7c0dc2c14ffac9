#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use folio::application::identity::NewUser;
use folio::application::ports::PasswordResetNotifier;
use folio::domain::{DomainResult, Role, User};
use folio::infrastructure::crypto::{JwtConfig, TokenCodec};
use folio::infrastructure::database::init_in_memory;
use folio::infrastructure::rate_limit::{RateLimitConfig, RateLimiter};
use folio::{create_api_router, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// Keeps every reset token instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Poll until `count` notifications arrived (they may come from a
    /// background task).
    pub async fn wait_for(&self, count: usize) -> Vec<(String, String)> {
        for _ in 0..100 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl PasswordResetNotifier for RecordingNotifier {
    async fn send_password_reset(&self, email: &str, token: &str) -> DomainResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub codec: TokenCodec,
    pub notifier: Arc<RecordingNotifier>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_limit(1_000).await
}

pub async fn spawn_app_with_limit(requests_per_window: u32) -> TestApp {
    let db = init_in_memory().await.expect("in-memory database");
    let codec = TokenCodec::new(JwtConfig {
        secret: "integration-secret".into(),
        access_ttl: Duration::minutes(30),
        reset_ttl: Duration::minutes(10),
        issuer: "folio-test".into(),
    });
    let limiter = RateLimiter::shared(RateLimitConfig {
        requests_per_window,
        window: StdDuration::from_secs(60),
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let state = AppState::new(
        db,
        codec.clone(),
        limiter,
        notifier.clone(),
        4 /* bcrypt's private MIN_COST */,
    );
    let router = create_api_router(state.clone(), None);

    TestApp {
        router,
        state,
        codec,
        notifier,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    /// OAuth2 password-grant login against `/auth/token`.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let form = format!(
            "username={}&password={}",
            email.replace('@', "%40"),
            password
        );
        let request = Request::post("/api/v1/auth/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        self.send(request).await
    }

    pub async fn token_for(&self, email: &str) -> String {
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.text);
        response.body["access_token"].as_str().unwrap().to_string()
    }

    /// Insert a user directly through the service, bypassing HTTP.
    pub async fn seed_user(&self, email: &str, role: Role, verified: bool) -> User {
        self.state
            .users
            .create_user(
                NewUser {
                    email: email.to_string(),
                    password: PASSWORD.to_string(),
                    role,
                    verified,
                },
                false,
            )
            .await
            .unwrap()
    }

    pub async fn admin_token(&self) -> String {
        self.seed_user("admin@example.com", Role::Admin, true).await;
        self.token_for("admin@example.com").await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
