//! Request middleware.
//!
//! # Responsibilities
//! - Hook the outermost request boundary, before and after MVC dispatch
//! - Run registered middlewares in registration order
//!
//! # Design Decisions
//! - BeginRequest sees every request; the other three hooks only run when
//!   every earlier stage let the request through (no route miss, no static
//!   route, no result, cancel or error)
//! - Same short-circuit rules as filters: error, result, or cancel stops the chain

pub mod request_log;

use std::sync::Arc;

use crate::filter::HookResult;
use crate::http::HttpContext;

pub use request_log::RequestLogMiddleware;

/// A hook around the whole request.
pub trait Middleware: Send + Sync {
    fn on_begin_request(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }

    fn on_begin_mvc_handle(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }

    fn on_end_mvc_handle(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }

    fn on_end_request(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareStage {
    BeginRequest,
    BeginMvcHandle,
    EndMvcHandle,
    EndRequest,
}

impl MiddlewareStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeginRequest => "begin_request",
            Self::BeginMvcHandle => "begin_mvc_handle",
            Self::EndMvcHandle => "end_mvc_handle",
            Self::EndRequest => "end_request",
        }
    }
}

/// Registered middlewares, in execution order.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    pub fn begin_request(&self, ctx: &mut HttpContext) -> HookResult {
        self.run(ctx, MiddlewareStage::BeginRequest)
    }

    pub fn begin_mvc_handle(&self, ctx: &mut HttpContext) -> HookResult {
        self.run(ctx, MiddlewareStage::BeginMvcHandle)
    }

    pub fn end_mvc_handle(&self, ctx: &mut HttpContext) -> HookResult {
        self.run(ctx, MiddlewareStage::EndMvcHandle)
    }

    pub fn end_request(&self, ctx: &mut HttpContext) -> HookResult {
        self.run(ctx, MiddlewareStage::EndRequest)
    }

    fn run(&self, ctx: &mut HttpContext, stage: MiddlewareStage) -> HookResult {
        for middleware in &self.middlewares {
            let outcome = match stage {
                MiddlewareStage::BeginRequest => middleware.on_begin_request(ctx),
                MiddlewareStage::BeginMvcHandle => middleware.on_begin_mvc_handle(ctx),
                MiddlewareStage::EndMvcHandle => middleware.on_end_mvc_handle(ctx),
                MiddlewareStage::EndRequest => middleware.on_end_request(ctx),
            };
            match outcome {
                Ok(None) if !ctx.is_canceled() => {}
                other => {
                    tracing::trace!(stage = stage.as_str(), "Middleware chain stopped");
                    return other;
                }
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.middlewares.len())
            .finish()
    }
}
