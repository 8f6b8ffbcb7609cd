//! Destination URL normalization.
//!
//! Destinations are stored exactly as normalized here and handed back
//! verbatim in redirects, so the function must be idempotent.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Normalizes a destination URL.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. An explicit `scheme://` must be `http` or `https` (any case)
/// 3. Input without a scheme gets an `https://` prefix
/// 4. The result must parse as an absolute URL with a host
///
/// The returned string is the trimmed (and possibly prefixed) input, not a
/// re-serialization, so `example.com` becomes `https://example.com` with no
/// trailing slash added.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::Empty`] for blank input.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
/// Returns [`UrlNormalizationError::InvalidFormat`] for anything unparseable.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("  example.com ").unwrap(), "https://example.com");
/// assert_eq!(normalize_url("http://example.com").unwrap(), "http://example.com");
/// assert!(normalize_url("ftp://example.com").is_err());
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let candidate = match trimmed.find("://") {
        Some(idx) => {
            let scheme = &trimmed[..idx];
            if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
                return Err(UrlNormalizationError::UnsupportedProtocol);
            }
            trimmed.to_string()
        }
        None => format!("https://{trimmed}"),
    };

    let parsed =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::InvalidFormat(
            "URL has no host".to_string(),
        ));
    }

    Ok(candidate)
}
