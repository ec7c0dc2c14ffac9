pub mod admin;
pub mod auth;
pub mod documents;
pub mod health;
pub mod metrics;
pub mod posts;
pub mod request_id;
