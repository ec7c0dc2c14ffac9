use async_trait::async_trait;
use uuid::Uuid;

use super::{CreatePostDto, Post};
use crate::shared::DomainResult;

#[async_trait]
pub trait PostRepositoryInterface: Send + Sync {
    async fn create_post(&self, dto: CreatePostDto) -> DomainResult<Post>;
    async fn list_posts_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Post>>;
}
