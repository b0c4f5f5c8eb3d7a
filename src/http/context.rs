//! Per-request state.
//!
//! # Responsibilities
//! - Own the inbound request parts and the pending response
//! - Carry route data, form values, view data and the cancellation flag
//! - Offer shorthand constructors for the common action results
//!
//! # Design Decisions
//! - Exclusively owned by one request flow; nothing in here is shared
//! - Form values are parsed once, before the MVC stages run
//! - Cancellation is cooperative and only checked between stages

use axum::body::Bytes;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{Extensions, HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::response::ResponseBuffer;
use crate::http::result::{BoxedResult, FileResult, GenericResult, ViewResult};
use crate::routing::RouteData;
use crate::view::ViewEngine;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

pub struct HttpContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    form: HashMap<String, String>,
    form_parsed: bool,
    route_data: Option<RouteData>,
    response: ResponseBuffer,
    canceled: bool,
    view_data: Map<String, Value>,
    extensions: Extensions,
    view_engine: Option<Arc<dyn ViewEngine>>,
}

impl HttpContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            form: HashMap::new(),
            form_parsed: false,
            route_data: None,
            response: ResponseBuffer::new(),
            canceled: false,
            view_data: Map::new(),
            extensions: Extensions::new(),
            view_engine: None,
        }
    }

    pub(crate) fn with_view_engine(mut self, engine: Option<Arc<dyn ViewEngine>>) -> Self {
        self.view_engine = engine;
        self
    }

    // Request

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A request header as text, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parse the query string and, for urlencoded requests, the body. Body
    /// values shadow query values of the same name. Only the first call
    /// does any work.
    pub fn parse_form(&mut self) {
        if self.form_parsed {
            return;
        }
        self.form_parsed = true;

        if let Some(query) = self.uri.query() {
            self.form
                .extend(url::form_urlencoded::parse(query.as_bytes()).into_owned());
        }
        let is_form = self
            .header(header::CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with(FORM_URLENCODED));
        if is_form && !self.body.is_empty() {
            self.form
                .extend(url::form_urlencoded::parse(&self.body).into_owned());
        }
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// A route parameter, falling back to a form or query value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.route_data
            .as_ref()
            .and_then(|rd| rd.get(name))
            .or_else(|| self.form_value(name))
    }

    pub fn route_data(&self) -> Option<&RouteData> {
        self.route_data.as_ref()
    }

    pub fn set_route_data(&mut self, route_data: RouteData) {
        self.route_data = Some(route_data);
    }

    // Flow control

    /// Stop the pipeline after the current stage.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    // Shared data

    pub fn view_data(&self) -> &Map<String, Value> {
        &self.view_data
    }

    pub fn view_data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.view_data
    }

    /// Make `value` available to every view rendered for this request.
    pub fn set_data(&mut self, key: impl Into<String>, value: Value) {
        self.view_data.insert(key.into(), value);
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    // Direct response writes

    pub fn response(&self) -> &ResponseBuffer {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseBuffer {
        &mut self.response
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.insert_header(name, value);
    }

    pub fn content_type(&mut self, content_type: &'static str) {
        self.set_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    pub fn status(&mut self, status: StatusCode) {
        self.response.set_status(status);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.response.write(bytes);
    }

    pub fn write_str(&mut self, content: &str) {
        self.response.write(content.as_bytes());
    }

    // Result shorthands

    /// The view named after the current action.
    pub fn view(&self, data: Value) -> BoxedResult {
        ViewResult::new(self.view_engine.clone(), None, data).boxed()
    }

    /// A named view.
    pub fn render(&self, view_name: &str, data: Value) -> BoxedResult {
        ViewResult::new(self.view_engine.clone(), Some(view_name.to_string()), data).boxed()
    }

    pub fn view_with_layout(&self, view_name: Option<&str>, layout: &str, data: Value) -> BoxedResult {
        ViewResult::new(
            self.view_engine.clone(),
            view_name.map(str::to_string),
            data,
        )
        .with_layout(layout)
        .boxed()
    }

    pub fn html(&self, body: impl Into<Vec<u8>>) -> BoxedResult {
        GenericResult::html(body).boxed()
    }

    /// JSON body; a value that fails to serialize becomes a 500.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> BoxedResult {
        match GenericResult::json(value) {
            Ok(result) => result.boxed(),
            Err(err) => GenericResult::error(err.to_string()).boxed(),
        }
    }

    pub fn raw(&self, body: impl Into<Vec<u8>>) -> BoxedResult {
        GenericResult::raw(body).boxed()
    }

    pub fn redirect(&self, location: &str) -> BoxedResult {
        GenericResult::redirect(location).boxed()
    }

    pub fn redirect_permanent(&self, location: &str) -> BoxedResult {
        GenericResult::redirect_permanent(location).boxed()
    }

    pub fn not_found(&self, message: &str) -> BoxedResult {
        GenericResult::not_found(message).boxed()
    }

    pub fn not_modified(&self) -> BoxedResult {
        GenericResult::not_modified().boxed()
    }

    pub fn error(&self, message: impl Into<String>) -> BoxedResult {
        GenericResult::error(message).boxed()
    }

    /// Stream a file from disk.
    pub fn content(&self, path: impl Into<PathBuf>) -> BoxedResult {
        FileResult::new(path).boxed()
    }

    /// Flush the pending response.
    pub async fn into_response(self) -> Response {
        self.response
            .into_response(&self.method, &self.uri, &self.headers)
            .await
    }

    #[cfg(test)]
    pub(crate) fn for_test(method: &str, uri: &str) -> Self {
        Self::new(
            Method::from_bytes(method.as_bytes()).unwrap(),
            uri.parse().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        )
    }
}

impl std::fmt::Debug for HttpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContext")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("route_data", &self.route_data)
            .field("canceled", &self.canceled)
            .finish_non_exhaustive()
    }
}
