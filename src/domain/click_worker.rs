//! Background worker applying click counter increments.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Retries after the first failed increment (20ms, 40ms, 80ms).
const RETRY_ATTEMPTS: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// Each event becomes one `increment_clicks` call, retried with exponential
/// backoff. An increment that still fails is logged and dropped; the visitor
/// was redirected long ago.
pub async fn run_click_worker<L>(mut rx: mpsc::Receiver<ClickEvent>, repository: Arc<L>)
where
    L: LinkRepository + ?Sized,
{
    while let Some(event) = rx.recv().await {
        record_click(repository.as_ref(), &event).await;
    }

    tracing::info!("Click worker stopped");
}

async fn record_click<L>(repository: &L, event: &ClickEvent)
where
    L: LinkRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(10)
        .take(RETRY_ATTEMPTS);

    let result = Retry::spawn(strategy, || repository.increment_clicks(event.link_id)).await;

    match result {
        Ok(()) => {
            tracing::debug!(link_id = %event.link_id, short_code = %event.short_code, "Click recorded");
        }
        Err(e) => {
            metrics::counter!("link_click_increment_failed_total").increment(1);
            tracing::error!(
                link_id = %event.link_id,
                short_code = %event.short_code,
                error = %e,
                "Failed to record click"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_each_event_increments_once() {
        let id = Uuid::new_v4();

        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks()
            .withf(move |link_id| *link_id == id)
            .times(2)
            .returning(|_| Ok(()));

        let (tx, rx) = mpsc::channel(8);
        tx.send(ClickEvent::new(id, "abc")).await.unwrap();
        tx.send(ClickEvent::new(id, "abc")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo)).await;
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks().times(3).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(())
            }
        });

        let (tx, rx) = mpsc::channel(8);
        tx.send(ClickEvent::new(Uuid::new_v4(), "abc")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_failure_is_swallowed() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks()
            .times(1 + RETRY_ATTEMPTS)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (tx, rx) = mpsc::channel(8);
        tx.send(ClickEvent::new(Uuid::new_v4(), "abc")).await.unwrap();
        drop(tx);

        // Completes without panicking once the channel closes.
        run_click_worker(rx, Arc::new(repo)).await;
    }
}
