//! In-memory user repository

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserRepositoryInterface,
};

/// In-memory storage for development and testing
///
/// The email index is claimed through the map's entry API, so two concurrent
/// creates with the same email cannot both succeed.
pub struct InMemoryUserRepository {
    users: DashMap<String, (u64, User)>,
    emails: DashMap<String, String>,
    sequence: AtomicU64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let id = uuid::Uuid::new_v4().to_string();

        match self.emails.entry(dto.email.clone()) {
            Entry::Occupied(_) => return Err(DomainError::email_taken(&dto.email)),
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        let now = Utc::now();
        let user = User {
            id: id.clone(),
            email: dto.email,
            name: dto.name,
            avatar: dto.avatar,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.users.insert(id, (seq, user.clone()));
        Ok(user)
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let mut rows: Vec<(u64, User)> = self.users.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, user)| user).collect())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|r| r.value().1.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        self.get_user_by_id(&id).await
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let Some(mut entry) = self.users.get_mut(id) else {
            return Ok(None);
        };

        let user = &mut entry.value_mut().1;
        if let Some(name) = dto.name {
            user.name = Some(name);
        }
        if let Some(avatar) = dto.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(active) = dto.active {
            user.active = active;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: &str) -> DomainResult<bool> {
        match self.users.remove(id) {
            Some((_, (_, user))) => {
                self.emails.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            name: None,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(dto("a@example.com")).await.unwrap();

        let err = repo.create_user(dto("a@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_frees_the_email() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user(dto("a@example.com")).await.unwrap();

        assert!(repo.delete_user(&user.id).await.unwrap());
        assert!(!repo.delete_user(&user.id).await.unwrap());
        assert!(repo.get_user_by_email("a@example.com").await.unwrap().is_none());

        repo.create_user(dto("a@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let repo = InMemoryUserRepository::new();
        for email in ["c@example.com", "a@example.com", "b@example.com"] {
            repo.create_user(dto(email)).await.unwrap();
        }

        let emails: Vec<String> = repo
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, ["c@example.com", "a@example.com", "b@example.com"]);
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let repo = InMemoryUserRepository::new();
        let result = repo
            .update_user("missing", UpdateUserDto::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
