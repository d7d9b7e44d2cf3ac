//! Browser hardening headers added to every application response.

use axum::http::header::{
    CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
    X_DNS_PREFETCH_CONTROL, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

pub(crate) const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; \
     style-src 'self' 'unsafe-inline'; \
     script-src 'self' 'unsafe-inline' 'unsafe-eval'; \
     img-src 'self' data: https:; \
     font-src 'self' https: data:; \
     object-src 'none'; \
     base-uri 'self'; \
     frame-ancestors 'self'";

fn security_headers() -> [(HeaderName, HeaderValue); 10] {
    [
        (
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
        ),
        (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        (X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off")),
        (X_XSS_PROTECTION, HeaderValue::from_static("0")),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("x-permitted-cross-domain-policies"),
            HeaderValue::from_static("none"),
        ),
    ]
}

/// Adds each hardening header unless the handler already set it.
pub(crate) fn with_security_headers(router: Router) -> Router {
    security_headers()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(name, value))
        })
}
