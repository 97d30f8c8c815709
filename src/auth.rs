//! Bearer token resolution for proxied upstream calls.
//!
//! The gateway does not validate credentials itself; it forwards whatever
//! bearer token the client supplied, falling back to the configured default.

use http::HeaderMap;

/// Resolves the upstream bearer token from the inbound `Authorization` header.
///
/// Tolerates a `Bearer ` prefix in any case, treats the literals `none` and
/// `null` (any case) as absent, and falls back to `default_token` when the
/// header yields nothing usable.
pub fn resolve_token(headers: &HeaderMap, default_token: &str) -> String {
    let raw = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    normalize_token(raw, default_token)
}

fn normalize_token(raw: &str, default_token: &str) -> String {
    let mut token = raw.trim();
    if token.len() >= 7 && token[..7].eq_ignore_ascii_case("bearer ") {
        token = token[7..].trim();
    }
    if token.eq_ignore_ascii_case("none") || token.eq_ignore_ascii_case("null") {
        token = "";
    }
    if token.is_empty() {
        default_token.to_string()
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_token() {
        assert_eq!(normalize_token("abc123", "fallback"), "abc123");
    }

    #[test]
    fn test_bearer_prefix_stripped() {
        assert_eq!(normalize_token("Bearer abc123", "fb"), "abc123");
        assert_eq!(normalize_token("bearer abc123", "fb"), "abc123");
        assert_eq!(normalize_token("BEARER  abc123 ", "fb"), "abc123");
    }

    #[test]
    fn test_none_and_null_treated_as_absent() {
        assert_eq!(normalize_token("none", "fb"), "fb");
        assert_eq!(normalize_token("Bearer null", "fb"), "fb");
        assert_eq!(normalize_token("NULL", "fb"), "fb");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(normalize_token("", "fb"), "fb");
        assert_eq!(normalize_token("   ", "fb"), "fb");
        assert_eq!(normalize_token("Bearer ", "fb"), "fb");
    }

    #[test]
    fn test_header_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            "Bearer tok-1".parse().unwrap(),
        );
        assert_eq!(resolve_token(&headers, "fb"), "tok-1");
        assert_eq!(resolve_token(&HeaderMap::new(), "fb"), "fb");
    }
}
