//! Database repository implementations

pub mod post_repository;
pub mod user_repository;

pub use post_repository::PostRepository;
pub use user_repository::UserRepository;

use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Primary keys are stored as hyphenated UUID text.
pub(crate) fn parse_id(raw: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DomainError::Storage(format!("Malformed id '{}': {}", raw, e)))
}
