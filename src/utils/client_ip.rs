//! Client identity extraction for rate limiting.

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};
use std::net::SocketAddr;

/// Identity used when a request carries no usable address.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the identity a request is rate limited under.
///
/// With `behind_proxy`, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise only the peer socket address is trusted. Falls back
/// to [`UNKNOWN_CLIENT`].
pub fn client_identity(headers: &HeaderMap, extensions: &Extensions, behind_proxy: bool) -> String {
    if behind_proxy
        && let Some(ip) = forwarded_ip(headers)
    {
        return ip;
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_xff = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let from_real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    from_xff.or_else(from_real_ip).map(str::to_string)
}
