//! Database entities module

pub mod user;

pub use user::Entity as User;
