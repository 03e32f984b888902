//! User management service: application-layer orchestration
//!
//! Every mutating use-case first checks that its target exists (or, for
//! creation, that the email is free) and then delegates to the repository.
//! The check is not atomic with the write: the repository's own uniqueness
//! enforcement remains the source of truth and surfaces as `Conflict` too.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserRepositoryInterface,
};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepositoryInterface>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepositoryInterface>) -> Self {
        Self { repo }
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if self.repo.get_user_by_email(&dto.email).await?.is_some() {
            return Err(DomainError::email_taken(&dto.email));
        }

        let user = self.repo.create_user(dto).await?;

        info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    pub async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<User> {
        let existing = self.get_user(id).await?;

        if dto.is_empty() {
            debug!(user_id = %id, "Empty update, returning stored user");
            return Ok(existing);
        }

        let user = self
            .repo
            .update_user(id, dto)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: &str) -> DomainResult<()> {
        self.get_user(id).await?;

        if !self.repo.delete_user(id).await? {
            return Err(DomainError::user_not_found(id));
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn get_user(&self, id: &str) -> DomainResult<User> {
        self.repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }
}
