//! Auth module: token issuance, current user, password reset

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
