//! Infrastructure layer, for external concerns

pub mod crypto;
pub mod database;
pub mod notifier;
pub mod rate_limit;

pub use database::{init_database, run_migrations, DatabaseConfig};
pub use notifier::LogNotifier;
pub use rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};
