//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use uuid::Uuid;
use validator::Validate;

use crate::application::services::CreateLink;
use crate::domain::entities::{Link, LinkPatch, LinkStats};

/// Request body for `POST /api/links`.
///
/// `original_url` may omit the scheme (`example.com` is stored as
/// `https://example.com`). Alias rules are enforced by the allocator.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub original_url: String,

    pub custom_alias: Option<String>,

    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        CreateLink {
            original_url: req.original_url,
            custom_alias: req.custom_alias.filter(|a| !a.is_empty()),
            title: req.title,
            expires_at: req.expires_at,
        }
    }
}

/// Request body for `PUT /api/links/{id}`.
///
/// All fields are optional, only provided fields are changed.
///
/// # `expires_at` semantics
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear expiry (link never expires)
/// - **Timestamp** → set new expiry
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub original_url: Option<String>,

    pub custom_alias: Option<String>,

    /// An empty string clears the title.
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub is_active: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        LinkPatch {
            original_url: req.original_url,
            custom_alias: req.custom_alias.filter(|a| !a.is_empty()),
            title: req.title,
            active: req.is_active,
            expires_at: req.expires_at,
        }
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
    pub title: Option<String>,
    pub clicks: i64,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            original_url: link.original_url,
            short_code: link.short_code,
            short_url,
            title: link.title,
            clicks: link.click_count,
            is_active: link.active,
            expires_at: link.expires_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Page of the caller's links.
#[derive(Debug, Serialize)]
pub struct ListLinksResponse {
    pub items: Vec<LinkResponse>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub limit: i64,
    pub offset: i64,
    pub count: usize,
}

/// Aggregated counters over the caller's links.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_links: i64,
    pub total_clicks: i64,
    pub active_links: i64,
    pub expired_links: i64,
}

impl From<LinkStats> for StatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            total_links: stats.total_links,
            total_clicks: stats.total_clicks,
            active_links: stats.active_links,
            expired_links: stats.expired_links,
        }
    }
}
