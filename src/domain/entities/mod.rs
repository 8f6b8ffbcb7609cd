//! Core domain entities.
//!
//! Entities are plain data with small state predicates; persistence and
//! business rules live in the repository and service layers.
//!
//! - [`Link`] - A shortened URL owned by a user
//! - [`User`] - A registered account
//!
//! Creation uses separate input structs (`NewLink`, `NewUser`), updates use
//! [`LinkPatch`].

pub mod link;
pub mod user;

pub use link::{Link, LinkPatch, LinkStats, NewLink};
pub use user::{NewUser, User};
