use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::parse_id;
use super::post_repository::{load_posts, load_tags};
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, Role, UpdateUserDto, User, UserProfile,
    UserRepositoryInterface,
};
use crate::infrastructure::database::entities::user;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> Role {
    match role {
        user::UserRole::Admin => Role::Admin,
        user::UserRole::User => Role::User,
    }
}

fn domain_role_to_entity(role: Role) -> user::UserRole {
    match role {
        Role::Admin => user::UserRole::Admin,
        Role::User => user::UserRole::User,
    }
}

fn user_model_to_domain(model: user::Model) -> DomainResult<User> {
    Ok(User {
        id: parse_id(&model.id)?,
        email: model.email,
        password_hash: model.password_hash,
        verified: model.verified,
        role: entity_role_to_domain(model.role),
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn email_taken(email: &str) -> DomainError {
    DomainError::Conflict(format!("User with email '{}' already exists", email))
}

/// Unique index violations surface as `Conflict`, everything else as storage.
fn write_err(e: DbErr, email: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => email_taken(email),
        _ => DomainError::from(e),
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let txn = self.db.begin().await?;

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(dto.email.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(email_taken(&dto.email));
        }

        let now = Utc::now();
        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(dto.email.clone()),
            password_hash: Set(dto.password_hash),
            verified: Set(dto.verified),
            role: Set(domain_role_to_entity(dto.role)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = new_user
            .insert(&txn)
            .await
            .map_err(|e| write_err(e, &dto.email))?;
        txn.commit().await?;

        user_model_to_domain(model)
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await?
            .into_iter()
            .map(user_model_to_domain)
            .collect()
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(user_model_to_domain)
            .transpose()
    }

    async fn get_user_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(user_model_to_domain)
            .transpose()
    }

    async fn load_profile(&self, id: Uuid) -> DomainResult<Option<UserProfile>> {
        let Some(user) = self.get_user_by_id(id).await? else {
            return Ok(None);
        };

        let posts = load_posts(&self.db, id).await?;
        let tags = load_tags(&self.db, id).await?;

        Ok(Some(UserProfile { user, posts, tags }))
    }

    async fn update_user(&self, id: Uuid, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let txn = self.db.begin().await?;

        let Some(existing) = user::Entity::find_by_id(id.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        if let Some(ref email) = dto.email {
            if *email != existing.email {
                let taken = user::Entity::find()
                    .filter(user::Column::Email.eq(email.as_str()))
                    .one(&txn)
                    .await?;
                if taken.is_some() {
                    return Err(email_taken(email));
                }
            }
        }

        let conflict_email = dto.email.clone().unwrap_or_else(|| existing.email.clone());
        let mut active: user::ActiveModel = existing.into();

        if let Some(email) = dto.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = dto.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = dto.role {
            active.role = Set(domain_role_to_entity(role));
        }
        if let Some(verified) = dto.verified {
            active.verified = Set(verified);
        }
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&txn)
            .await
            .map_err(|e| write_err(e, &conflict_email))?;
        txn.commit().await?;

        user_model_to_domain(model).map(Some)
    }

    async fn delete_user(&self, id: Uuid) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("User", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreatePostDto, PostRepositoryInterface};
    use crate::infrastructure::database::entities::{post, post_tag, tag};
    use crate::infrastructure::database::{init_in_memory, PostRepository};
    use sea_orm::PaginatorTrait;

    fn new_user(email: &str) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            verified: true,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_and_creates_nothing() {
        let db = init_in_memory().await.unwrap();
        let repo = UserRepository::new(db.clone());

        repo.create_user(new_user("a@example.com")).await.unwrap();
        let err = repo.create_user(new_user("a@example.com")).await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn email_lookup_is_exact() {
        let db = init_in_memory().await.unwrap();
        let repo = UserRepository::new(db);
        let created = repo.create_user(new_user("Mixed@Example.com")).await.unwrap();

        let found = repo.get_user_by_email("Mixed@Example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.get_user_by_email("mixed@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let db = init_in_memory().await.unwrap();
        let repo = UserRepository::new(db);
        let created = repo.create_user(new_user("a@example.com")).await.unwrap();

        let updated = repo
            .update_user(
                created.id,
                UpdateUserDto {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.email, "a@example.com");
        assert_eq!(updated.password_hash, "hash");
        assert!(repo.update_user(Uuid::new_v4(), UpdateUserDto::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let db = init_in_memory().await.unwrap();
        let repo = UserRepository::new(db);
        repo.create_user(new_user("a@example.com")).await.unwrap();
        let b = repo.create_user(new_user("b@example.com")).await.unwrap();

        let err = repo
            .update_user(
                b.id,
                UpdateUserDto {
                    email: Some("a@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let db = init_in_memory().await.unwrap();
        let repo = UserRepository::new(db);
        let err = repo.delete_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn delete_cascades_to_posts_and_tags() {
        let db = init_in_memory().await.unwrap();
        let users = UserRepository::new(db.clone());
        let posts = PostRepository::new(db.clone());

        let owner = users.create_user(new_user("a@example.com")).await.unwrap();
        posts
            .create_post(CreatePostDto {
                user_id: owner.id,
                title: "First".into(),
                content: "Hello".into(),
                tags: vec!["rust".into(), "web".into()],
            })
            .await
            .unwrap();

        users.delete_user(owner.id).await.unwrap();

        assert_eq!(post::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(tag::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(post_tag::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn post_for_deleted_owner_is_not_found() {
        let db = init_in_memory().await.unwrap();
        let users = UserRepository::new(db.clone());
        let posts = PostRepository::new(db.clone());

        let owner = users.create_user(new_user("a@example.com")).await.unwrap();
        users.delete_user(owner.id).await.unwrap();

        let err = posts
            .create_post(CreatePostDto {
                user_id: owner.id,
                title: "Orphan".into(),
                content: "body".into(),
                tags: vec!["rust".into()],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
        assert_eq!(tag::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn profile_includes_posts_with_tags() {
        let db = init_in_memory().await.unwrap();
        let users = UserRepository::new(db.clone());
        let posts = PostRepository::new(db);

        let owner = users.create_user(new_user("a@example.com")).await.unwrap();
        for (title, tags) in [("One", vec!["rust", "db"]), ("Two", vec!["rust", " ", "rust"])] {
            posts
                .create_post(CreatePostDto {
                    user_id: owner.id,
                    title: title.into(),
                    content: "body".into(),
                    tags: tags.into_iter().map(String::from).collect(),
                })
                .await
                .unwrap();
        }

        let profile = users.load_profile(owner.id).await.unwrap().unwrap();
        assert_eq!(profile.user.id, owner.id);
        assert_eq!(profile.posts.len(), 2);

        let one = profile.posts.iter().find(|p| p.title == "One").unwrap();
        let names: Vec<_> = one.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["db", "rust"]);

        let two = profile.posts.iter().find(|p| p.title == "Two").unwrap();
        assert_eq!(two.tags.len(), 1);

        // "rust" is shared between both posts rather than duplicated
        assert_eq!(profile.tags.len(), 2);
        assert!(users.load_profile(Uuid::new_v4()).await.unwrap().is_none());
    }
}
