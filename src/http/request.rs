//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate or propagate a unique request ID (UUID v4)
//! - Recover the raw request target after a route prefix
//! - Reconstruct the full request URL for diagnostics
//!
//! # Design Decisions
//! - Identifiers are taken from the raw URI; the parser decodes the path
//!   for matching and `arkpid` reflects exactly what the client sent

use axum::http::{header, HeaderMap, HeaderName, Uri};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer assigning a UUID to requests that do not carry one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request ID header value, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Path and query as received, with `prefix` removed from the front.
pub fn raw_target<'a>(uri: &'a Uri, prefix: &str) -> &'a str {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    target.strip_prefix(prefix).unwrap_or(target)
}

/// Absolute URL of the request, using the Host header when present.
pub fn request_url(uri: &Uri, headers: &HeaderMap) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("http://{host}{target}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_raw_target_keeps_query() {
        let uri: Uri = "/ark:/12345/x?info".parse().unwrap();
        assert_eq!(raw_target(&uri, "/"), "ark:/12345/x?info");

        let uri: Uri = "/diag/12345/x??".parse().unwrap();
        assert_eq!(raw_target(&uri, "/diag/"), "12345/x??");
    }

    #[test]
    fn test_raw_target_is_not_decoded() {
        let uri: Uri = "/12345/a%20b?%3F".parse().unwrap();
        assert_eq!(raw_target(&uri, "/"), "12345/a%20b?%3F");
    }

    #[test]
    fn test_request_url_from_host() {
        let uri: Uri = "/12345/x?y".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(request_url(&uri, &headers), "http://localhost/12345/x?y");

        headers.insert(header::HOST, HeaderValue::from_static("n2t.example:8080"));
        assert_eq!(request_url(&uri, &headers), "http://n2t.example:8080/12345/x?y");
    }

    #[test]
    fn test_request_id_fallback() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), "abc");
    }
}
