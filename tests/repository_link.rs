//! PostgreSQL repository tests. Require `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use link_shortener::domain::entities::{NewLink, NewUser};
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::{PgLinkRepository, PgUserRepository};

async fn create_owner(pool: Arc<PgPool>, name: &str) -> Uuid {
    let users = PgUserRepository::new(pool);
    users
        .create(NewUser {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
        .id
}

fn new_link(owner_id: Uuid, code: &str) -> NewLink {
    NewLink {
        id: Uuid::new_v4(),
        owner_id,
        original_url: "https://example.com".to_string(),
        short_code: code.to_string(),
        title: None,
        expires_at: None,
    }
}

#[sqlx::test]
#[ignore]
async fn test_create_and_find(pool: PgPool) {
    let pool = Arc::new(pool);
    let owner = create_owner(pool.clone(), "alice").await;
    let repo = PgLinkRepository::new(pool);

    let link = repo.create(new_link(owner, "abc123")).await.unwrap();

    assert_eq!(link.click_count, 0);
    assert!(link.active);
    assert!(repo.exists_by_code("abc123").await.unwrap());
    assert_eq!(
        repo.find_by_code("abc123").await.unwrap().map(|l| l.id),
        Some(link.id)
    );
    assert_eq!(
        repo.find_by_id(link.id).await.unwrap().map(|l| l.short_code),
        Some("abc123".to_string())
    );
}

#[sqlx::test]
#[ignore]
async fn test_duplicate_code_is_conflict(pool: PgPool) {
    let pool = Arc::new(pool);
    let owner = create_owner(pool.clone(), "alice").await;
    let repo = PgLinkRepository::new(pool);

    repo.create(new_link(owner, "dup")).await.unwrap();
    let err = repo.create(new_link(owner, "dup")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
}

#[sqlx::test]
#[ignore]
async fn test_update_and_delete(pool: PgPool) {
    let pool = Arc::new(pool);
    let owner = create_owner(pool.clone(), "alice").await;
    let repo = PgLinkRepository::new(pool);

    let mut link = repo.create(new_link(owner, "before")).await.unwrap();
    link.short_code = "after".to_string();
    link.active = false;
    link.title = Some("Title".to_string());

    let updated = repo.update(link.clone()).await.unwrap();
    assert_eq!(updated.short_code, "after");
    assert!(!updated.active);
    assert!(!repo.exists_by_code("before").await.unwrap());

    assert!(repo.delete(link.id).await.unwrap());
    assert!(!repo.delete(link.id).await.unwrap());
}

#[sqlx::test]
#[ignore]
async fn test_update_missing_is_not_found(pool: PgPool) {
    let pool = Arc::new(pool);
    let owner = create_owner(pool.clone(), "alice").await;
    let repo = PgLinkRepository::new(pool);

    let link = repo.create(new_link(owner, "gone")).await.unwrap();
    repo.delete(link.id).await.unwrap();

    let err = repo.update(link).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[sqlx::test]
#[ignore]
async fn test_list_by_owner_newest_first(pool: PgPool) {
    let pool = Arc::new(pool);
    let alice = create_owner(pool.clone(), "alice").await;
    let bob = create_owner(pool.clone(), "bob").await;
    let repo = PgLinkRepository::new(pool);

    for code in ["one", "two", "three"] {
        repo.create(new_link(alice, code)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    repo.create(new_link(bob, "bobs")).await.unwrap();

    let page = repo.list_by_owner(alice, 2, 0).await.unwrap();
    let codes: Vec<_> = page.iter().map(|l| l.short_code.as_str()).collect();
    assert_eq!(codes, ["three", "two"]);

    let rest = repo.list_by_owner(alice, 2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
}

#[sqlx::test]
#[ignore]
async fn test_increment_clicks_and_stats(pool: PgPool) {
    let pool = Arc::new(pool);
    let owner = create_owner(pool.clone(), "alice").await;
    let repo = PgLinkRepository::new(pool);
    let now = Utc::now();

    let live = repo.create(new_link(owner, "live")).await.unwrap();
    for _ in 0..3 {
        repo.increment_clicks(live.id).await.unwrap();
    }

    let mut expired = new_link(owner, "expired");
    expired.expires_at = Some(now - Duration::hours(1));
    repo.create(expired).await.unwrap();

    let stats = repo.stats_by_owner(owner, now).await.unwrap();
    assert_eq!(stats.total_links, 2);
    assert_eq!(stats.total_clicks, 3);
    assert_eq!(stats.active_links, 1);
    assert_eq!(stats.expired_links, 1);
}

#[sqlx::test]
#[ignore]
async fn test_user_lookup(pool: PgPool) {
    let pool = Arc::new(pool);
    let users = PgUserRepository::new(pool.clone());
    let id = create_owner(pool, "carol").await;

    assert!(users.exists_by_email("carol@example.com").await.unwrap());
    assert!(users.exists_by_username("carol").await.unwrap());
    assert_eq!(
        users
            .find_by_email("carol@example.com")
            .await
            .unwrap()
            .map(|u| u.id),
        Some(id)
    );
    assert!(users.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}
