use async_trait::async_trait;

use super::{CreateUserDto, UpdateUserDto, User};
use crate::domain::DomainResult;

/// Persistence port for users.
///
/// Implementations own id generation and must report an email uniqueness
/// violation as `DomainError::Conflict`.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Returns `None` when no user has this id.
    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    /// Returns `false` when no user has this id.
    async fn delete_user(&self, id: &str) -> DomainResult<bool>;
}
