//! Response buffering and the final flush.
//!
//! # Responsibilities
//! - Hold the pending status, headers and body while the pipeline runs
//! - Hand file responses to the static file service
//! - Convert the buffer into exactly one HTTP response
//!
//! # Design Decisions
//! - Nothing reaches the client until the pipeline has finished
//! - The flush consumes the buffer, so it cannot happen twice
//! - A missing status is a contract violation, never an implicit 200

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Pending response state for one request.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    file: Option<PathBuf>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Set a header, replacing any previous value.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Append to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Stream `path` instead of the buffered body.
    pub fn serve_file(&mut self, path: PathBuf) {
        self.file = Some(path);
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Drop everything written so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Turn the buffer into the response sent to the client. The request
    /// line and headers are needed for conditional and range file requests.
    pub async fn into_response(
        self,
        method: &Method,
        uri: &Uri,
        request_headers: &HeaderMap,
    ) -> Response {
        if let Some(path) = self.file {
            let mut request = Request::new(Body::empty());
            *request.method_mut() = method.clone();
            *request.uri_mut() = uri.clone();
            *request.headers_mut() = request_headers.clone();

            let mut response = match ServeFile::new(&path).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            };
            if response.status() == StatusCode::NOT_FOUND {
                tracing::debug!(path = %path.display(), "Static file not found");
            }
            response.headers_mut().extend(self.headers);
            return response;
        }

        let Some(status) = self.status else {
            tracing::error!(uri = %uri, "Response completed without a status code");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        };

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}
