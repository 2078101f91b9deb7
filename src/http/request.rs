//! Request inspection.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Extract the host a request is addressed to
//! - Rebuild the fully qualified URL the rewrite rules are matched against
//!
//! # Design Decisions
//! - Absolute-form targets (what browsers send to a proxy) are used verbatim
//! - Origin-form targets are qualified with the Host header and `http://`

use axum::http::{header, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID v4 for every request without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID assigned by the request-id layer, or "unknown".
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Host (and optional port) the request is addressed to.
///
/// The Host header wins; the URI authority is used when it is missing.
pub fn request_host<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

/// Fully qualified URL of the requested resource.
pub fn request_url<B>(request: &Request<B>) -> Option<String> {
    let uri = request.uri();
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Some(uri.to_string());
    }

    let host = request_host(request)?;
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    Some(format!("http://{}{}", host, path))
}
