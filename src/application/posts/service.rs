use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{CreatePostDto, DomainResult, Post, PostRepositoryInterface};

/// Post use-cases for the authenticated caller
pub struct PostService<R: PostRepositoryInterface> {
    repo: Arc<R>,
}

impl<R: PostRepositoryInterface> PostService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create_post(
        &self,
        user_id: Uuid,
        title: String,
        content: String,
        tags: Vec<String>,
    ) -> DomainResult<Post> {
        let post = self
            .repo
            .create_post(CreatePostDto {
                user_id,
                title,
                content,
                tags,
            })
            .await?;

        info!(user_id = %user_id, post_id = %post.id, tags = post.tags.len(), "Post created");
        Ok(post)
    }

    pub async fn list_posts(&self, user_id: Uuid) -> DomainResult<Vec<Post>> {
        self.repo.list_posts_for_user(user_id).await
    }
}
