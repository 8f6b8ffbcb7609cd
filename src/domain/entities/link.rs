//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A shortened URL owned by a user.
///
/// `short_code` is unique across all links. A link resolves only while it is
/// active and its expiry (if any) has not passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_url: String,
    pub short_code: String,
    pub title: Option<String>,
    pub click_count: i64,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Builds a freshly created link with zero clicks.
    pub fn from_new(new_link: NewLink, now: DateTime<Utc>) -> Self {
        Self {
            id: new_link.id,
            owner_id: new_link.owner_id,
            original_url: new_link.original_url,
            short_code: new_link.short_code,
            title: new_link.title,
            click_count: 0,
            active: true,
            expires_at: new_link.expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true once `expires_at` is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if a visitor may be redirected through this link at `now`.
    pub fn is_resolvable_at(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired_at(now)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_url: String,
    pub short_code: String,
    pub title: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Owner-requested changes to an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub original_url: Option<String>,
    pub custom_alias: Option<String>,
    pub title: Option<String>,
    pub active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Aggregated counters over one owner's links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub total_links: i64,
    pub total_clicks: i64,
    pub active_links: i64,
    pub expired_links: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_link(expires_at: Option<DateTime<Utc>>) -> NewLink {
        NewLink {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            original_url: "https://example.com".to_string(),
            short_code: "abc123".to_string(),
            title: None,
            expires_at,
        }
    }

    #[test]
    fn test_from_new_defaults() {
        let now = Utc::now();
        let input = new_link(None);
        let id = input.id;
        let link = Link::from_new(input, now);

        assert_eq!(link.id, id);
        assert_eq!(link.click_count, 0);
        assert!(link.active);
        assert_eq!(link.created_at, now);
        assert_eq!(link.updated_at, now);
        assert!(link.is_resolvable_at(now));
    }

    #[test]
    fn test_expired_link_is_not_resolvable_even_if_active() {
        let now = Utc::now();
        let link = Link::from_new(new_link(Some(now - Duration::seconds(1))), now);

        assert!(link.active);
        assert!(link.is_expired_at(now));
        assert!(!link.is_resolvable_at(now));
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        let link = Link::from_new(new_link(Some(now)), now);
        assert!(link.is_expired_at(now));
    }

    #[test]
    fn test_future_expiry_is_resolvable() {
        let now = Utc::now();
        let link = Link::from_new(new_link(Some(now + Duration::hours(1))), now);
        assert!(link.is_resolvable_at(now));
    }

    #[test]
    fn test_inactive_link_is_not_resolvable() {
        let now = Utc::now();
        let mut link = Link::from_new(new_link(None), now);
        link.active = false;
        assert!(!link.is_resolvable_at(now));
    }

    #[test]
    fn test_ownership() {
        let input = new_link(None);
        let owner = input.owner_id;
        let link = Link::from_new(input, Utc::now());

        assert!(link.is_owned_by(owner));
        assert!(!link.is_owned_by(Uuid::new_v4()));
    }
}
