//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and business rules, and
//! give HTTP handlers a small API to call.
//!
//! - [`services::link_service::LinkService`] - Link management, redirects and stats
//! - [`services::code_allocator::CodeAllocator`] - Short code allocation
//! - [`services::auth_service::AuthService`] - Accounts and session tokens

pub mod services;
