use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::parse_id;
use crate::domain::{CreatePostDto, DomainError, DomainResult, Post, PostRepositoryInterface, Tag};
use crate::infrastructure::database::entities::{post, post_tag, tag, user};

pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn tag_model_to_domain(model: tag::Model) -> DomainResult<Tag> {
    Ok(Tag {
        id: parse_id(&model.id)?,
        name: model.name,
        user_id: parse_id(&model.user_id)?,
    })
}

fn post_model_to_domain(model: post::Model, tags: Vec<tag::Model>) -> DomainResult<Post> {
    let mut tags = tags
        .into_iter()
        .map(tag_model_to_domain)
        .collect::<DomainResult<Vec<_>>>()?;
    tags.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Post {
        id: parse_id(&model.id)?,
        title: model.title,
        content: model.content,
        user_id: parse_id(&model.user_id)?,
        tags,
        created_at: model.created_at,
    })
}

/// Posts owned by `user_id`, each with its tags, oldest first.
pub(crate) async fn load_posts<C: ConnectionTrait>(db: &C, user_id: Uuid) -> DomainResult<Vec<Post>> {
    let rows = post::Entity::find()
        .filter(post::Column::UserId.eq(user_id.to_string()))
        .order_by_asc(post::Column::CreatedAt)
        .order_by_asc(post::Column::Id)
        .find_with_related(tag::Entity)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(post, tags)| post_model_to_domain(post, tags))
        .collect()
}

pub(crate) async fn load_tags<C: ConnectionTrait>(db: &C, user_id: Uuid) -> DomainResult<Vec<Tag>> {
    tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id.to_string()))
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(tag_model_to_domain)
        .collect()
}

/// Trimmed, de-duplicated, non-empty tag names in stable order.
fn normalize_tag_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl PostRepositoryInterface for PostRepository {
    async fn create_post(&self, dto: CreatePostDto) -> DomainResult<Post> {
        let owner = dto.user_id.to_string();
        let txn = self.db.begin().await?;

        // Tokens outlive deleted accounts
        if user::Entity::find_by_id(owner.as_str()).one(&txn).await?.is_none() {
            return Err(DomainError::not_found("User", "id", dto.user_id));
        }

        let mut tags = Vec::new();
        for name in normalize_tag_names(dto.tags) {
            let existing = tag::Entity::find()
                .filter(tag::Column::UserId.eq(owner.as_str()))
                .filter(tag::Column::Name.eq(name.as_str()))
                .one(&txn)
                .await?;

            let model = match existing {
                Some(model) => model,
                None => {
                    debug!(user_id = %dto.user_id, tag = %name, "Creating tag");
                    tag::ActiveModel {
                        id: Set(Uuid::new_v4().to_string()),
                        name: Set(name),
                        user_id: Set(owner.clone()),
                    }
                    .insert(&txn)
                    .await?
                }
            };
            tags.push(model);
        }

        let post = post::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(dto.title),
            content: Set(dto.content),
            user_id: Set(owner),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        for tag in &tags {
            post_tag::ActiveModel {
                post_id: Set(post.id.clone()),
                tag_id: Set(tag.id.clone()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        post_model_to_domain(post, tags)
    }

    async fn list_posts_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Post>> {
        load_posts(&self.db, user_id).await
    }
}

