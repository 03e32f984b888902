use chrono::{DateTime, Utc};

/// A registered user.
///
/// `id` is assigned once at creation and never changes. `active` is a stored
/// flag only; nothing in the service restricts inactive users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
