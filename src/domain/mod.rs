//! Domain layer: entities, DTOs, errors and repository ports.

pub mod error;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use user::{CreateUserDto, UpdateUserDto, User, UserRepositoryInterface};
