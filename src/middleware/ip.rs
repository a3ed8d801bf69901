//! Client key derivation for the rate limiting middleware.
//!
//! The limiter keys counters by network address: one counter per distinct
//! address, no deduplication across proxies or NAT. That is a known
//! limitation of address-based keying, not something this module papers
//! over.
//!
//! # Security Warning: IP Spoofing Risk
//!
//! These headers are client-controlled. Deploy the gateway behind a trusted
//! reverse proxy that overwrites (not appends to) `X-Forwarded-For`, and
//! block direct internet access to this service. Otherwise clients can
//! rotate spoofed addresses to dodge their counters.
//!
//! # The "unknown" fallback
//!
//! Requests with no identifiable address all share the [`UNKNOWN_IP`] key
//! and therefore one collective counter. Rejecting such requests outright
//! would turn a proxy misconfiguration into an outage, so they are limited
//! as a single bucket instead. Monitor for high "unknown" traffic.

use std::borrow::Cow;

use axum::http::Request;

/// Fallback key when no client address can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Extract the client key from request headers.
///
/// Checks in order (first match wins):
/// 1. `X-Forwarded-For` - first address in the comma-separated chain
/// 2. `X-Real-IP`
/// 3. [`UNKNOWN_IP`]
///
/// Returns `Cow<'static, str>`: borrowed for the fallback (no allocation),
/// owned for an actual address.
#[inline]
pub fn extract_client_ip<B>(req: &Request<B>) -> Cow<'static, str> {
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first_ip) = value.split(',').next()
    {
        return Cow::Owned(first_ip.trim().to_string());
    }

    if let Some(real_ip) = req.headers().get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
    {
        return Cow::Owned(value.trim().to_string());
    }

    Cow::Borrowed(UNKNOWN_IP)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_extract_ip_from_xff() {
        let req = Request::builder()
            .header("x-forwarded-for", "192.168.1.1, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_client_ip(&req), "192.168.1.1");
    }

    #[test]
    fn test_extract_ip_from_real_ip() {
        let req = Request::builder()
            .header("x-real-ip", "203.0.113.50")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_client_ip(&req), "203.0.113.50");
    }

    #[test]
    fn test_xff_takes_priority_over_real_ip() {
        let req = Request::builder()
            .header("x-forwarded-for", "10.0.0.1")
            .header("x-real-ip", "192.168.1.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_client_ip(&req), "10.0.0.1");
    }

    #[test]
    fn test_missing_headers_fall_back_to_unknown() {
        let req = Request::builder().body(Body::empty()).unwrap();

        let ip = extract_client_ip(&req);
        assert_eq!(ip, UNKNOWN_IP);
        assert!(matches!(ip, Cow::Borrowed(_)));
    }

    #[test]
    fn test_xff_whitespace_is_trimmed() {
        let req = Request::builder()
            .header("x-forwarded-for", "  192.168.1.1  , 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_client_ip(&req), "192.168.1.1");
    }

    #[test]
    fn test_xff_with_ipv6() {
        let req = Request::builder()
            .header("x-forwarded-for", "2001:db8::1, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_client_ip(&req), "2001:db8::1");
    }
}
