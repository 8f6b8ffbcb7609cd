//! Link management and resolution service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::application::services::code_allocator::{AllocationError, CodeAllocator};
use crate::domain::entities::{Link, LinkPatch, LinkStats, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// Write attempts for a generated code before giving up on conflicts.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Owner-supplied fields for a new link.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub title: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for creating, managing and resolving short links.
///
/// Destination URLs are normalized on every write. Short codes come from the
/// [`CodeAllocator`]; a unique-constraint conflict at write time is reported
/// for explicit aliases and retried with a fresh code for generated ones.
pub struct LinkService<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    allocator: CodeAllocator<L>,
    base_url: String,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a link service.
    ///
    /// `base_url` prefixes returned short URLs: `{base_url}/r/{code}`.
    pub fn new(repository: Arc<L>, base_url: impl Into<String>) -> Self {
        let allocator = CodeAllocator::new(Arc::clone(&repository));
        Self::with_allocator(repository, allocator, base_url)
    }

    pub fn with_allocator(
        repository: Arc<L>,
        allocator: CodeAllocator<L>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            allocator,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Full public URL for a short code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/r/{}", self.base_url, code)
    }

    /// Creates a short link owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an invalid URL or alias
    /// - [`AppError::Conflict`] if the requested alias is taken, including
    ///   when another writer claims it between check and insert
    /// - [`AppError::Internal`] if no free code could be generated
    pub async fn create_link(&self, owner_id: Uuid, input: CreateLink) -> Result<Link, AppError> {
        let original_url = normalize(&input.original_url)?;
        let title = clean_title(input.title);
        let alias = input.custom_alias.as_deref();

        let mut attempt = 0;
        loop {
            attempt += 1;

            let short_code = self.allocator.allocate(alias).await?;

            let new_link = NewLink {
                id: Uuid::new_v4(),
                owner_id,
                original_url: original_url.clone(),
                short_code: short_code.clone(),
                title: title.clone(),
                expires_at: input.expires_at,
            };

            match self.repository.create(new_link).await {
                Ok(link) => {
                    metrics::counter!("links_created_total").increment(1);
                    tracing::info!(
                        link_id = %link.id,
                        short_code = %link.short_code,
                        owner_id = %owner_id,
                        "Link created"
                    );
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) if alias.is_none() && attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::warn!(short_code = %short_code, attempt, "Short code claimed concurrently, retrying");
                }
                Err(AppError::Conflict { .. }) => {
                    return Err(AllocationError::AliasConflict(short_code).into());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Returns one of the owner's links.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the link does not exist
    /// - [`AppError::Forbidden`] if it belongs to someone else
    pub async fn get_link(&self, owner_id: Uuid, id: Uuid) -> Result<Link, AppError> {
        let link = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))?;

        if !link.is_owned_by(owner_id) {
            return Err(AppError::forbidden(
                "Link belongs to another user",
                json!({ "id": id }),
            ));
        }

        Ok(link)
    }

    pub async fn list_links(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        self.repository.list_by_owner(owner_id, limit, offset).await
    }

    /// Applies an owner's changes to a link.
    ///
    /// A new URL is normalized the same way as on create. A new alias goes
    /// through the allocator with the link's own code treated as free.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_link`], plus validation and alias conflicts.
    pub async fn update_link(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        let mut link = self.get_link(owner_id, id).await?;

        if let Some(url) = patch.original_url {
            link.original_url = normalize(&url)?;
        }

        if let Some(alias) = patch.custom_alias.as_deref() {
            link.short_code = self
                .allocator
                .allocate_for(Some(alias), Some(&link.short_code))
                .await?;
        }

        if patch.title.is_some() {
            link.title = clean_title(patch.title);
        }

        if let Some(active) = patch.active {
            link.active = active;
        }

        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }

        let short_code = link.short_code.clone();
        match self.repository.update(link).await {
            Ok(updated) => {
                tracing::info!(link_id = %updated.id, "Link updated");
                Ok(updated)
            }
            Err(AppError::Conflict { .. }) => Err(AllocationError::AliasConflict(short_code).into()),
            Err(e) => Err(e),
        }
    }

    /// Permanently deletes one of the owner's links.
    pub async fn delete_link(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.get_link(owner_id, id).await?;

        if !self.repository.delete(id).await? {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        }

        tracing::info!(link_id = %id, "Link deleted");
        Ok(())
    }

    /// Looks up the link a visitor should be redirected through.
    ///
    /// Inactive and expired links resolve like missing ones.
    pub async fn resolve(&self, short_code: &str) -> Result<Link, AppError> {
        self.repository
            .find_by_code(short_code)
            .await?
            .filter(|link| link.is_resolvable_at(Utc::now()))
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_code": short_code }))
            })
    }

    pub async fn stats(&self, owner_id: Uuid) -> Result<LinkStats, AppError> {
        self.repository.stats_by_owner(owner_id, Utc::now()).await
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.health_check().await
    }
}

fn normalize(url: &str) -> Result<String, AppError> {
    normalize_url(url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })
}

fn clean_title(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
