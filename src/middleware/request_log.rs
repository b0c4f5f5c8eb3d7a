//! Request logging middleware.

use crate::filter::HookResult;
use crate::http::{HttpContext, RequestIdExt};
use crate::middleware::Middleware;

/// Logs each request as it enters the pipeline. The matching completion
/// line comes from the HTTP host once the response has been flushed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogMiddleware;

impl Middleware for RequestLogMiddleware {
    fn on_begin_request(&self, ctx: &mut HttpContext) -> HookResult {
        tracing::info!(
            request_id = ctx.request_id().unwrap_or("unknown"),
            method = %ctx.method(),
            path = %ctx.path(),
            "Request started"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_short_circuits() {
        let mut ctx = HttpContext::for_test("GET", "/home");
        let middleware = RequestLogMiddleware;
        assert!(middleware.on_begin_request(&mut ctx).unwrap().is_none());
        assert!(middleware.on_end_request(&mut ctx).unwrap().is_none());
        assert!(!ctx.is_canceled());
    }
}
