//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`rate_limiter`] - Per-client sliding-window admission control
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click counter updates
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves a link
//! 2. A [`click_event::ClickEvent`] is pushed onto a bounded channel without waiting
//! 3. [`click_worker::run_click_worker`] increments the counter with a short retry
//! 4. Failures are logged and the click is lost

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod rate_limiter;
pub mod repositories;
