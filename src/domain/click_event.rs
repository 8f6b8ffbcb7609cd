//! Click event model for asynchronous click counting.

use uuid::Uuid;

/// A resolved redirect waiting to be counted.
///
/// Created by the redirect handler and sent over a bounded channel to
/// [`crate::domain::click_worker::run_click_worker`], so the HTTP response never
/// waits on the counter update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: Uuid,
    pub short_code: String,
}

impl ClickEvent {
    pub fn new(link_id: Uuid, short_code: impl Into<String>) -> Self {
        Self {
            link_id,
            short_code: short_code.into(),
        }
    }
}
