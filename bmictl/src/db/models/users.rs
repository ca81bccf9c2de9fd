//! Database models for users.

use crate::types::UserId;

/// Database request for creating a new user. The password is hashed by the repository.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub password: String,
}

/// Database response for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    /// Argon2id PHC string
    #[sqlx(rename = "password")]
    pub password_hash: String,
}
