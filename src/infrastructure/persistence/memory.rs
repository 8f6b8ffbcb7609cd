//! In-process repositories.
//!
//! Enforce the same uniqueness rules as the PostgreSQL schema, including
//! reporting a taken short code, email or username as [`AppError::Conflict`].
//! Used by the HTTP test suite and for running without a database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkStats, NewLink, NewUser, User};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn short_code_conflict(code: &str) -> AppError {
    AppError::conflict(
        "Unique constraint violation",
        json!({ "constraint": "links_short_code_key", "short_code": code }),
    )
}

#[derive(Default)]
pub struct MemoryLinkRepository {
    links: Mutex<HashMap<Uuid, Link>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        lock(&self.links).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        Ok(lock(&self.links).values().any(|l| l.short_code == code))
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = lock(&self.links);

        if links.values().any(|l| l.short_code == new_link.short_code) {
            return Err(short_code_conflict(&new_link.short_code));
        }

        let link = Link::from_new(new_link, Utc::now());
        links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError> {
        Ok(lock(&self.links).get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(lock(&self.links)
            .values()
            .find(|l| l.short_code == code)
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let mut owned: Vec<Link> = lock(&self.links)
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn update(&self, mut link: Link) -> Result<Link, AppError> {
        let mut links = lock(&self.links);

        if !links.contains_key(&link.id) {
            return Err(AppError::not_found("Link not found", json!({ "id": link.id })));
        }

        if links
            .values()
            .any(|l| l.id != link.id && l.short_code == link.short_code)
        {
            return Err(short_code_conflict(&link.short_code));
        }

        if let Some(current) = links.get(&link.id) {
            link.click_count = current.click_count;
            link.created_at = current.created_at;
        }
        link.updated_at = Utc::now();

        links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(lock(&self.links).remove(&id).is_some())
    }

    async fn increment_clicks(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(link) = lock(&self.links).get_mut(&id) {
            link.click_count += 1;
        }
        Ok(())
    }

    async fn stats_by_owner(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LinkStats, AppError> {
        let links = lock(&self.links);

        Ok(links
            .values()
            .filter(|l| l.owner_id == owner_id)
            .fold(LinkStats::default(), |mut stats, l| {
                stats.total_links += 1;
                stats.total_clicks += l.click_count;
                if l.is_resolvable_at(now) {
                    stats.active_links += 1;
                }
                if l.is_expired_at(now) {
                    stats.expired_links += 1;
                }
                stats
            }))
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = lock(&self.users);

        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "users_email_key" }),
            ));
        }
        if users.values().any(|u| u.username == new_user.username) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "users_username_key" }),
            ));
        }

        let user = User::from_new(new_user, Utc::now());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users)
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(lock(&self.users).values().any(|u| u.email == email))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        Ok(lock(&self.users).values().any(|u| u.username == username))
    }
}
