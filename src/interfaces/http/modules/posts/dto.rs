//! Post and tag DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Post, Tag};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TagDto {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

impl From<Tag> for TagDto {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            user_id: t.user_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Uuid,
    pub tags: Vec<TagDto>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            user_id: p.user_id,
            tags: p.tags.into_iter().map(TagDto::from).collect(),
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    pub content: String,
    /// Tag names; unknown names are created for the caller
    #[serde(default)]
    #[validate(length(max = 32, message = "at most 32 tags"))]
    pub tags: Vec<String>,
}
