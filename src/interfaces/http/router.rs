//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::documents::{DocumentProcessor, TextStats, UploadReport};
use crate::application::identity::{Authorizer, UserService};
use crate::application::ports::PasswordResetNotifier;
use crate::application::PostService;
use crate::domain::Role;
use crate::infrastructure::crypto::TokenCodec;
use crate::infrastructure::database::{PostRepository, UserRepository};
use crate::infrastructure::rate_limit::SharedRateLimiter;
use crate::interfaces::http::common::MessageResponse;
use crate::interfaces::http::modules::{
    admin, auth, documents, health, metrics, posts, request_id::request_id_middleware,
};

/// Everything the handlers share. Each module extracts its own slice
/// through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService<UserRepository>>,
    pub posts: Arc<PostService<PostRepository>>,
    pub authorizer: Authorizer,
    pub documents: DocumentProcessor,
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        codec: TokenCodec,
        limiter: SharedRateLimiter,
        notifier: Arc<dyn PasswordResetNotifier>,
        bcrypt_cost: u32,
    ) -> Self {
        let users = UserService::new(
            Arc::new(UserRepository::new(db.clone())),
            codec.clone(),
            notifier,
        )
        .with_bcrypt_cost(bcrypt_cost);

        Self {
            users: Arc::new(users),
            posts: Arc::new(PostService::new(Arc::new(PostRepository::new(db.clone())))),
            authorizer: Authorizer::new(codec, limiter),
            documents: DocumentProcessor::new(),
            db,
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for admin::AdminState {
    fn from_ref(s: &AppState) -> Self {
        admin::AdminState {
            users: Arc::clone(&s.users),
            authorizer: s.authorizer.clone(),
        }
    }
}

impl FromRef<AppState> for auth::AuthState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthState {
            users: Arc::clone(&s.users),
            authorizer: s.authorizer.clone(),
        }
    }
}

impl FromRef<AppState> for posts::PostsState {
    fn from_ref(s: &AppState) -> Self {
        posts::PostsState {
            posts: Arc::clone(&s.posts),
            authorizer: s.authorizer.clone(),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<AppState> for DocumentProcessor {
    fn from_ref(s: &AppState) -> Self {
        s.documents
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/v1/auth/token"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::issue_token,
        auth::get_current_user,
        auth::request_password_reset,
        auth::confirm_password_reset,
        admin::create_user,
        admin::list_users,
        admin::get_user,
        admin::update_user,
        admin::delete_user,
        posts::list_posts,
        posts::create_post,
        documents::process_document,
    ),
    components(
        schemas(
            Role,
            MessageResponse,
            health::HealthResponse,
            health::ComponentHealth,
            auth::TokenRequest,
            auth::TokenResponse,
            auth::ProfileDto,
            auth::ResetPasswordRequest,
            auth::ConfirmResetRequest,
            admin::UserDto,
            admin::CreateUserRequest,
            admin::UpdateUserRequest,
            posts::PostDto,
            posts::TagDto,
            posts::CreatePostRequest,
            documents::UploadForm,
            UploadReport,
            TextStats,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Token issuance, current user and password reset"),
        (name = "Admin", description = "User management, admin scope required"),
        (name = "Posts", description = "The caller's posts and tags"),
        (name = "Documents", description = "Upload analysis"),
    ),
    info(
        title = "Folio API",
        version = "1.0.0",
        description = "Token-authenticated users, posts and document analysis"
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes.
///
/// `/metrics` is only mounted when a Prometheus handle is supplied.
pub fn create_api_router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/token", post(auth::issue_token))
        .route("/me", get(auth::get_current_user))
        .route("/reset-password", post(auth::request_password_reset))
        .route("/reset-password/confirm", post(auth::confirm_password_reset));

    let admin_routes = Router::new()
        .route("/user", get(admin::list_users).post(admin::create_user))
        .route(
            "/user/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/documents/process", post(documents::process_document));

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state);

    if let Some(handle) = prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
