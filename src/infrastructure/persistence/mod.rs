//! Repository implementations.
//!
//! - [`PgLinkRepository`] / [`PgUserRepository`] - PostgreSQL via SQLx
//! - [`MemoryLinkRepository`] / [`MemoryUserRepository`] - in-process maps
//!
//! PostgreSQL queries are checked at runtime (`query_as` with `FromRow` rows),
//! so the crate builds without a live database.

pub mod memory;
pub mod pg_link_repository;
pub mod pg_user_repository;

pub use memory::{MemoryLinkRepository, MemoryUserRepository};
pub use pg_link_repository::PgLinkRepository;
pub use pg_user_repository::PgUserRepository;
