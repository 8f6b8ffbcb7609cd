//! Short code generation and alias validation.
//!
//! Generated codes are drawn from the operating system CSPRNG and encoded as
//! URL-safe base64. Caller-supplied aliases are checked against a fixed
//! length and character policy before anything else looks at them.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Number of random bytes drawn per generated code.
const CODE_ENTROPY_BYTES: usize = 8;

/// Length of every generated short code.
pub const GENERATED_CODE_LENGTH: usize = 8;

pub const ALIAS_MIN_LENGTH: usize = 3;
pub const ALIAS_MAX_LENGTH: usize = 20;

/// Why a caller-supplied alias was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AliasViolation {
    #[error("short code must be between 3 and 20 characters")]
    Length,

    #[error("short code can only contain letters, numbers, and hyphens")]
    Charset,
}

/// Source of candidate short codes.
///
/// Production uses [`RandomCodeGenerator`]; tests substitute deterministic
/// sequences to drive the collision paths.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> Result<String, AppError>;
}

/// CSPRNG-backed generator producing [`GENERATED_CODE_LENGTH`]-character codes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> Result<String, AppError> {
        generate_code()
    }
}

/// Generates a random short code.
///
/// Draws 8 bytes from `getrandom`, encodes them as URL-safe base64 without
/// padding and keeps the first 8 characters, so the result only contains
/// `A-Z`, `a-z`, `0-9`, `-` and `_`.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random source fails.
pub fn generate_code() -> Result<String, AppError> {
    let mut buffer = [0u8; CODE_ENTROPY_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer);
    code.truncate(GENERATED_CODE_LENGTH);

    Ok(code)
}

/// Validates a caller-supplied alias.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters, digits, hyphens
///
/// # Examples
///
/// ```ignore
/// assert!(validate_alias("my-link").is_ok());
/// assert_eq!(validate_alias("ab"), Err(AliasViolation::Length));
/// assert_eq!(validate_alias("has space"), Err(AliasViolation::Charset));
/// ```
pub fn validate_alias(alias: &str) -> Result<(), AliasViolation> {
    let len = alias.chars().count();
    if !(ALIAS_MIN_LENGTH..=ALIAS_MAX_LENGTH).contains(&len) {
        return Err(AliasViolation::Length);
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(AliasViolation::Charset);
    }

    Ok(())
}
