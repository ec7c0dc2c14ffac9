use async_trait::async_trait;
use uuid::Uuid;

use super::{CreateUserDto, UpdateUserDto, User, UserProfile};
use crate::shared::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a user. Fails with `Conflict` when the email is taken; the
    /// check and the insert share one transaction.
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    /// Load a user with posts (and their tags) and owned tags.
    async fn load_profile(&self, id: Uuid) -> DomainResult<Option<UserProfile>>;

    async fn update_user(&self, id: Uuid, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    async fn delete_user(&self, id: Uuid) -> DomainResult<()>;
}
