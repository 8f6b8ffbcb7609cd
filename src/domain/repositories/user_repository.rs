//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for user accounts.
///
/// Both `email` and `username` are unique; [`UserRepository::create`] returns
/// [`AppError::Conflict`] when either is already registered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;
}
