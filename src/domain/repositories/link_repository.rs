//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkStats, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository interface for managing short links.
///
/// Uniqueness of `short_code` is enforced by the store itself. Callers check
/// with [`LinkRepository::exists_by_code`] first, but a concurrent writer can
/// still claim the same code in between; such a write fails with
/// [`AppError::Conflict`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Verifies the store is reachable.
    async fn health_check(&self) -> Result<(), AppError>;

    /// Returns true if any link, active or not, already uses `code`.
    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError>;

    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError>;

    /// Finds a link by short code regardless of its active or expiry state.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists an owner's links, newest first.
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Persists the mutable fields of `link` and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    /// Returns [`AppError::Conflict`] if the new short code is already taken.
    async fn update(&self, link: Link) -> Result<Link, AppError>;

    /// Hard-deletes a link. Returns `Ok(false)` if nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Adds one to the link's click count.
    async fn increment_clicks(&self, id: Uuid) -> Result<(), AppError>;

    /// Aggregates counters over an owner's links as of `now`.
    async fn stats_by_owner(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LinkStats, AppError>;
}
