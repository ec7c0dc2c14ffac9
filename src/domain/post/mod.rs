//! Post aggregate (posts and the tags attached to them)

pub mod model;
pub mod repository;

pub use model::{CreatePostDto, Post, Tag};
pub use repository::PostRepositoryInterface;
