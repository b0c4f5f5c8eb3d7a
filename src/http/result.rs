//! Action results.
//!
//! # Responsibilities
//! - Represent the deferred response a handler, filter or middleware produces
//! - Write status, headers and body into the response buffer when executed
//!
//! # Design Decisions
//! - `GenericResult` always carries an explicit status; there is no implicit 200
//! - `ViewResult` renders into its own body, then executes as a generic result
//! - `FileResult` bypasses the body entirely and hands a path to the flush

use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::context::HttpContext;
use crate::http::response::ResponseBuffer;
use crate::view::{RenderError, ViewEngine, ViewRequest};

const TEXT_HTML: &str = "text/html; charset=utf-8";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// A response-producing value, executed once the pipeline accepts it.
pub trait ActionResult: Send {
    fn execute_result(&mut self, ctx: &mut HttpContext) -> Result<(), RenderError>;
}

pub type BoxedResult = Box<dyn ActionResult>;

/// Status, headers and a byte body.
#[derive(Debug, Clone)]
pub struct GenericResult {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl GenericResult {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_content_type(self, content_type: &'static str) -> Self {
        self.with_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn boxed(self) -> BoxedResult {
        Box::new(self)
    }

    /// 200 with an HTML body.
    pub fn html(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK)
            .with_content_type(TEXT_HTML)
            .with_body(body)
    }

    /// 200 with a plain text body.
    pub fn raw(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK)
            .with_content_type(TEXT_PLAIN)
            .with_body(body)
    }

    /// 200 with `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(StatusCode::OK)
            .with_content_type(APPLICATION_JSON)
            .with_body(body))
    }

    /// 302 to `location`.
    pub fn redirect(location: &str) -> Self {
        Self::redirect_with(StatusCode::FOUND, location)
    }

    /// 301 to `location`.
    pub fn redirect_permanent(location: &str) -> Self {
        Self::redirect_with(StatusCode::MOVED_PERMANENTLY, location)
    }

    fn redirect_with(status: StatusCode, location: &str) -> Self {
        match HeaderValue::from_str(location) {
            Ok(value) => Self::new(status)
                .with_content_type(TEXT_HTML)
                .with_header(header::LOCATION, value)
                .with_body(format!("Redirecting to: {location}")),
            Err(_) => Self::error("invalid redirect location"),
        }
    }

    /// 404; an empty message becomes `Page Not Found!`.
    pub fn not_found(message: &str) -> Self {
        let message = if message.is_empty() { "Page Not Found!" } else { message };
        Self::new(StatusCode::NOT_FOUND)
            .with_content_type(TEXT_HTML)
            .with_body(message)
    }

    /// 304 with no body.
    pub fn not_modified() -> Self {
        Self::new(StatusCode::NOT_MODIFIED)
    }

    /// 500 with `message` as plain text.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_content_type(TEXT_PLAIN)
            .with_body(message.into())
    }

    pub(crate) fn write_to(&self, sink: &mut ResponseBuffer) {
        for (name, value) in &self.headers {
            sink.insert_header(name.clone(), value.clone());
        }
        sink.set_status(self.status);
        if !self.body.is_empty() {
            sink.write(&self.body);
        }
    }
}

impl ActionResult for GenericResult {
    fn execute_result(&mut self, ctx: &mut HttpContext) -> Result<(), RenderError> {
        self.write_to(ctx.response_mut());
        Ok(())
    }
}

/// A template rendered by a [`ViewEngine`].
pub struct ViewResult {
    engine: Option<Arc<dyn ViewEngine>>,
    view_name: Option<String>,
    layout: Option<String>,
    data: Value,
    inner: GenericResult,
}

impl ViewResult {
    /// View named after the current action unless `view_name` is given.
    pub fn new(engine: Option<Arc<dyn ViewEngine>>, view_name: Option<String>, data: Value) -> Self {
        Self {
            engine,
            view_name,
            layout: None,
            data,
            inner: GenericResult::new(StatusCode::OK).with_content_type(TEXT_HTML),
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.inner.status = status;
        self
    }

    pub fn boxed(self) -> BoxedResult {
        Box::new(self)
    }

    /// Explicit data, with per-request view data filling absent keys.
    fn merged_data(&self, ctx: &HttpContext) -> Value {
        if ctx.view_data().is_empty() {
            return self.data.clone();
        }
        let mut merged = ctx.view_data().clone();
        match &self.data {
            Value::Object(explicit) => merged.extend(explicit.clone()),
            Value::Null => {}
            other => {
                merged.insert("model".to_string(), other.clone());
            }
        }
        Value::Object(merged)
    }
}

impl ActionResult for ViewResult {
    fn execute_result(&mut self, ctx: &mut HttpContext) -> Result<(), RenderError> {
        let engine = self.engine.clone().ok_or(RenderError::NoViewEngine)?;
        let (controller, action) = ctx
            .route_data()
            .map(|rd| (rd.controller.clone(), rd.action.clone()))
            .unwrap_or_default();
        let request = ViewRequest {
            controller: &controller,
            action: &action,
            view_name: self.view_name.as_deref(),
            layout: self.layout.as_deref(),
        };

        let data = self.merged_data(ctx);
        let mut body = Vec::new();
        engine.render(&request, &data, &mut body)?;
        self.inner.body = body;
        self.inner.execute_result(ctx)
    }
}

/// A file streamed from disk when the response is flushed.
#[derive(Debug, Clone)]
pub struct FileResult {
    path: PathBuf,
}

impl FileResult {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn boxed(self) -> BoxedResult {
        Box::new(self)
    }
}

impl ActionResult for FileResult {
    fn execute_result(&mut self, ctx: &mut HttpContext) -> Result<(), RenderError> {
        ctx.response_mut().serve_file(self.path.clone());
        Ok(())
    }
}
