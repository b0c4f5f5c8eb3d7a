//! Developer error page.
//!
//! Shown instead of the generic 500 body when `debug = true`. Carries the
//! failure message and the request line and headers, followed by the panic
//! location, the backtrace and the process environment.

use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use maud::{html, Markup, DOCTYPE};

use crate::http::{ActionResult, HttpContext};
use crate::view::RenderError;

/// A 500 response rendered as a diagnostic page.
#[derive(Debug, Clone)]
pub struct DiagnosticResult {
    status: StatusCode,
    message: String,
    location: Option<String>,
    stack: Option<String>,
}

impl DiagnosticResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            location: None,
            stack: None,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn with_stack(mut self, stack: Option<String>) -> Self {
        self.stack = stack;
        self
    }

    fn page(&self, ctx: &HttpContext) -> Markup {
        let title = format!("{} {}", self.status.as_u16(), self.status.canonical_reason().unwrap_or(""));
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (title) }
                    style { "body{font-family:monospace;margin:2em}pre{background:#f4f4f4;padding:1em;overflow:auto}th{text-align:left;padding-right:1em}" }
                }
                body {
                    h1 { (title) }
                    h2 { "Error" }
                    pre.error { (self.message) }
                    @if let Some(location) = &self.location {
                        p { "at " code { (location) } }
                    }
                    h2 { "Request" }
                    p { code { (ctx.method().as_str()) " " (ctx.uri().to_string()) } }
                    @if let Some(rd) = ctx.route_data() {
                        p { "route " code { (rd.route.name()) } ", controller " code { (rd.controller) } ", action " code { (rd.action) } }
                    }
                    table {
                        @for (name, value) in ctx.request_headers() {
                            tr { th { (name.as_str()) } td { (String::from_utf8_lossy(value.as_bytes()).into_owned()) } }
                        }
                    }
                    @if let Some(stack) = &self.stack {
                        h2 { "Stack" }
                        pre.stack { (stack) }
                    }
                    h2 { "Environment" }
                    table {
                        @for (name, value) in std::env::vars() {
                            tr { th { (name) } td { (value) } }
                        }
                    }
                    hr;
                    p { small { "trellis " (env!("CARGO_PKG_VERSION")) } }
                }
            }
        }
    }
}

impl ActionResult for DiagnosticResult {
    fn execute_result(&mut self, ctx: &mut HttpContext) -> Result<(), RenderError> {
        let page = self.page(ctx).into_string();
        let response = ctx.response_mut();
        response.reset();
        response.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response.set_status(self.status);
        response.write(page.as_bytes());
        Ok(())
    }
}
