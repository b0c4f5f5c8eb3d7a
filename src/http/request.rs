//! Request identification.
//!
//! # Responsibilities
//! - Assign an `x-request-id` to every request that arrives without one
//! - Echo the id on the response
//! - Expose the id to pipeline code for log correlation
//!
//! # Design Decisions
//! - Ids are generated by tower-http as UUID v4 strings
//! - An id supplied by the client is kept as is

use axum::http::HeaderMap;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::http::context::HttpContext;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that fills in a missing request id.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Read access to the request id.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> Option<&str> {
        self.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }
}

impl RequestIdExt for HttpContext {
    fn request_id(&self) -> Option<&str> {
        self.request_headers().request_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(headers.request_id(), None);
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(headers.request_id(), Some("abc-123"));
    }

    #[test]
    fn test_context_without_request_id() {
        let ctx = HttpContext::for_test("GET", "/");
        assert_eq!(ctx.request_id(), None);
    }
}
