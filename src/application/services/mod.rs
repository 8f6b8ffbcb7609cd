//! Business logic services.
//!
//! - [`LinkService`] - Link CRUD, redirect resolution and stats
//! - [`CodeAllocator`] - Short code validation, generation and uniqueness
//! - [`AuthService`] - Registration, login and session tokens

pub mod auth_service;
pub mod code_allocator;
pub mod link_service;

pub use auth_service::{AuthService, AuthSession, Claims, RegisterUser};
pub use code_allocator::{AllocationError, CodeAllocator};
pub use link_service::{CreateLink, LinkService};
