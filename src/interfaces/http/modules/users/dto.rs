//! User DTOs
//!
//! Request and response shapes for the user endpoints. The `validator`
//! rules here are the only input checks the service performs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{CreateUserDto, UpdateUserDto, User};

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    #[schema(example = "7f9c2ba4-e88f-4c4b-9a3f-5b6c9d1e2f30")]
    pub id: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub active: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            avatar: u.avatar,
            active: u.active,
        }
    }
}

/// All users
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserDto>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email)]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(min_length = 1, max_length = 100, example = "Jane Doe")]
    pub name: Option<String>,
    #[validate(url)]
    #[schema(example = "https://example.com/avatar.png")]
    pub avatar: Option<String>,
}

impl From<CreateUserRequest> for CreateUserDto {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            email: r.email,
            name: r.name,
            avatar: r.avatar,
        }
    }
}

/// Update user request. Omitted (or `null`) fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(min_length = 1, max_length = 100)]
    pub name: Option<String>,
    #[validate(url)]
    pub avatar: Option<String>,
    pub active: Option<bool>,
}

impl From<UpdateUserRequest> for UpdateUserDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            name: r.name,
            avatar: r.avatar,
            active: r.active,
        }
    }
}
