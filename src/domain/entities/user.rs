//! User account entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered account. `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_new(new_user: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: new_user.id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input data for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
