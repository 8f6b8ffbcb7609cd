//! Helpers used across the application.
//!
//! - [`code_generator`] - Short code generation and alias validation
//! - [`url_normalizer`] - Destination URL normalization
//! - [`password`] - Password hashing
//! - [`client_ip`] - Client identity extraction for rate limiting

pub mod client_ip;
pub mod code_generator;
pub mod password;
pub mod url_normalizer;
