pub mod post;
pub mod scope;
pub mod user;

pub use post::{CreatePostDto, Post, PostRepositoryInterface, Tag};
pub use scope::ScopeSet;
pub use user::{CreateUserDto, Role, UpdateUserDto, User, UserProfile, UserRepositoryInterface};

pub use crate::shared::{DomainError, DomainResult};
