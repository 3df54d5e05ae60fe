//! Response hardening headers.

use axum::{
    body::Body,
    http::{header, header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

const HARDENING_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
];

/// Stamp hardening headers on every response.
///
/// Bucket contents change with each upload, so responses without their own
/// `Cache-Control` get `no-store`.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in HARDENING_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
        .entry(header::CACHE_CONTROL)
        .or_insert(HeaderValue::from_static("no-store"));

    response
}
