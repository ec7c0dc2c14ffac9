//! # Folio API
//!
//! Web backend with token authentication, scope-based authorization,
//! per-user rate limiting, admin user management, posts with tags and a
//! document upload endpoint.
//!
//! ## Architecture
//!
//! - **domain**: entities, scopes and repository traits
//! - **application**: use cases (`UserService`, `Authorizer`, `PostService`, documents)
//! - **infrastructure**: SeaORM persistence, JWT and bcrypt, rate limiter, notifier
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: error taxonomy and shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::{create_api_router, AppState};
