//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkStats, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, owner_id, original_url, short_code, title, click_count, \
                            active, expires_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    owner_id: Uuid,
    original_url: String,
    short_code: String,
    title: Option<String>,
    click_count: i64,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            owner_id: r.owner_id,
            original_url: r.original_url,
            short_code: r.short_code,
            title: r.title,
            click_count: r.click_count,
            active: r.active,
            expires_at: r.expires_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_links: i64,
    total_clicks: i64,
    active_links: i64,
    expired_links: i64,
}

/// PostgreSQL repository for link storage and retrieval.
///
/// The `links_short_code_key` unique constraint backs the allocator's
/// check-then-insert; violations surface as [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM links WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            INSERT INTO links (id, owner_id, original_url, short_code, title, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row: LinkRow = sqlx::query_as(&sql)
            .bind(new_link.id)
            .bind(new_link.owner_id)
            .bind(&new_link.original_url)
            .bind(&new_link.short_code)
            .bind(&new_link.title)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1");

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#
        );

        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn update(&self, link: Link) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            UPDATE links
            SET original_url = $2,
                short_code   = $3,
                title        = $4,
                active       = $5,
                expires_at   = $6,
                updated_at   = NOW()
            WHERE id = $1
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(link.id)
            .bind(&link.original_url)
            .bind(&link.short_code)
            .bind(&link.title)
            .bind(link.active)
            .bind(link.expires_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link.id })))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_clicks(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn stats_by_owner(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LinkStats, AppError> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*)::BIGINT                                       AS total_links,
                COALESCE(SUM(click_count), 0)::BIGINT                  AS total_clicks,
                COUNT(*) FILTER (
                    WHERE active AND (expires_at IS NULL OR expires_at > $2)
                )::BIGINT                                              AS active_links,
                COUNT(*) FILTER (
                    WHERE expires_at IS NOT NULL AND expires_at <= $2
                )::BIGINT                                              AS expired_links
            FROM links
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkStats {
            total_links: row.total_links,
            total_clicks: row.total_clicks,
            active_links: row.active_links,
            expired_links: row.expired_links,
        })
    }
}
