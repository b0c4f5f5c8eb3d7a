//! The request state machine.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AppConfig, LogLevel};
use crate::controller::ControllerFactory;
use crate::dispatch::diagnostic::DiagnosticResult;
use crate::dispatch::recovery::{self, PanicReport};
use crate::filter::{executed_order, executing_order, run_filters, FilterStage};
use crate::http::{ActionResult, BoxedResult, FileResult, GenericResult, HttpContext, RequestIdExt};
use crate::middleware::MiddlewareChain;
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::view::{RenderError, ViewEngine};
use crate::BoxError;

/// Why a request did not complete normally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Returned by a middleware, filter or action handler.
    #[error("{0}")]
    Hook(BoxError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<BoxError> for PipelineError {
    fn from(err: BoxError) -> Self {
        Self::Hook(err)
    }
}

type StageResult = Result<Option<BoxedResult>, PipelineError>;

/// Percent-decode a request path for matching. `None` when the decoded
/// bytes are not UTF-8.
fn decode_path(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// True when a stage outcome ends the pipeline.
fn stops(ctx: &HttpContext, result: &Option<BoxedResult>) -> bool {
    ctx.is_canceled() || result.is_some()
}

/// Frozen routes, controllers and middlewares serving requests.
///
/// Built by [`crate::app::Application::build`]; nothing in here changes
/// after construction, so one instance is shared by every request.
pub struct RequestHandler {
    routes: RouteTable,
    controllers: ControllerFactory,
    middlewares: MiddlewareChain,
    view_engine: Option<Arc<dyn ViewEngine>>,
    config: Arc<AppConfig>,
}

impl RequestHandler {
    pub(crate) fn new(
        routes: RouteTable,
        controllers: ControllerFactory,
        middlewares: MiddlewareChain,
        view_engine: Option<Arc<dyn ViewEngine>>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            routes,
            controllers,
            middlewares,
            view_engine,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn controllers(&self) -> &ControllerFactory {
        &self.controllers
    }

    /// A fresh context wired to this handler's view engine.
    pub fn new_context(&self, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> HttpContext {
        HttpContext::new(method, uri, headers, body).with_view_engine(self.view_engine.clone())
    }

    /// Run the whole pipeline for `ctx`. Always leaves a response in the
    /// context's buffer; panics and errors are converted here and nowhere
    /// else.
    pub fn handle(&self, ctx: &mut HttpContext) {
        match recovery::catch(self.config.debug, || self.run(ctx)) {
            Ok(Ok(())) => {}
            Ok(Err(PipelineError::Hook(err))) => self.recover_error(ctx, err),
            Ok(Err(PipelineError::Render(err))) => {
                let message = err.to_string();
                self.recover_fatal(ctx, "render", message, None, None);
            }
            Err(PanicReport {
                message,
                location,
                backtrace,
            }) => self.recover_fatal(ctx, "panic", message, location, backtrace),
        }
    }

    /// Stages 1 to 7, then the surviving result.
    fn run(&self, ctx: &mut HttpContext) -> Result<(), PipelineError> {
        if let Some(mut result) = self.execute(ctx)? {
            result.execute_result(ctx)?;
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut HttpContext) -> StageResult {
        let result = self.middlewares.begin_request(ctx)?;
        if stops(ctx, &result) {
            return Ok(result);
        }

        let Some(path) = decode_path(ctx.path()) else {
            tracing::debug!(path = %ctx.path(), "Path is not valid UTF-8 once decoded");
            let result = GenericResult::new(StatusCode::BAD_REQUEST)
                .with_content_type("text/plain; charset=utf-8")
                .with_body("Bad Request: malformed URL path");
            return Ok(Some(result.boxed()));
        };
        let Some(route_data) = self.routes.match_url(&path) else {
            tracing::debug!(path = %path, "No route matched");
            let message = format!("Page Not Found! No Route For The URL: {path}");
            return Ok(Some(GenericResult::not_found(&message).boxed()));
        };

        if route_data.is_static() {
            let file = route_data.file_path.as_deref().and_then(|f| self.static_file(f));
            ctx.set_route_data(route_data);
            let result = match file {
                Some(file) => FileResult::new(file).boxed(),
                None => GenericResult::not_found("").boxed(),
            };
            return Ok(Some(result));
        }

        ctx.set_route_data(route_data);
        ctx.parse_form();

        let result = self.middlewares.begin_mvc_handle(ctx)?;
        if stops(ctx, &result) {
            return Ok(result);
        }

        let result = self.execute_controller(ctx)?;
        if stops(ctx, &result) {
            return Ok(result);
        }

        let result = self.middlewares.end_mvc_handle(ctx)?;
        if stops(ctx, &result) {
            return Ok(result);
        }

        Ok(self.middlewares.end_request(ctx)?)
    }

    fn execute_controller(&self, ctx: &mut HttpContext) -> StageResult {
        let (controller, action) = match ctx.route_data() {
            Some(rd) => (rd.controller.clone(), rd.action.clone()),
            None => return Ok(Some(GenericResult::not_found("").boxed())),
        };
        let Some(resolved) = self.controllers.get_action(ctx.method(), &controller, &action) else {
            tracing::debug!(
                method = %ctx.method(),
                controller = %controller,
                action = %action,
                "No action registered"
            );
            let message = format!("No action for controller: {controller}, action: {action}");
            return Ok(Some(GenericResult::not_found(&message).boxed()));
        };

        let executing = executing_order(resolved.controller.filters(), resolved.action.filters());
        let executed = executed_order(resolved.controller.filters(), resolved.action.filters());

        let result = run_filters(ctx, &executing, FilterStage::ActionExecuting)?;
        if stops(ctx, &result) {
            return Ok(result);
        }

        let mut action_result = (resolved.action.handler())(ctx)?;

        let result = run_filters(ctx, &executed, FilterStage::ActionExecuted)?;
        if stops(ctx, &result) {
            return Ok(result);
        }

        let result = run_filters(ctx, &executing, FilterStage::ResultExecuting)?;
        if stops(ctx, &result) {
            return Ok(result);
        }

        action_result.execute_result(ctx)?;

        Ok(run_filters(ctx, &executed, FilterStage::ResultExecuted)?)
    }

    /// `root_dir/static_path/relative`, or `None` when `relative` tries to
    /// leave the static root.
    fn static_file(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            tracing::debug!(path = %relative.display(), "Rejected static file path");
            return None;
        }
        Some(self.config.paths.static_root().join(relative))
    }

    fn should_log(&self) -> bool {
        self.config.log.level >= LogLevel::Error || self.config.debug
    }

    /// Errors returned by hooks become a plain 500 carrying the message.
    fn recover_error(&self, ctx: &mut HttpContext, err: BoxError) {
        metrics::record_dispatch_failure("error");
        if self.should_log() {
            tracing::error!(
                request_id = ctx.request_id().unwrap_or("unknown"),
                path = %ctx.path(),
                error = %err,
                "Request failed"
            );
        }
        ctx.response_mut().reset();
        self.write_fallback(ctx, GenericResult::error(err.to_string()));
    }

    /// Panics and render failures: diagnostic page in debug, opaque 500
    /// otherwise.
    fn recover_fatal(
        &self,
        ctx: &mut HttpContext,
        kind: &'static str,
        message: String,
        location: Option<String>,
        backtrace: Option<String>,
    ) {
        metrics::record_dispatch_failure(kind);
        if self.should_log() {
            tracing::error!(
                request_id = ctx.request_id().unwrap_or("unknown"),
                path = %ctx.path(),
                kind,
                error = %message,
                location = location.as_deref().unwrap_or("unknown"),
                "Request aborted"
            );
        }
        ctx.response_mut().reset();
        if self.config.debug {
            let mut page = DiagnosticResult::new(message)
                .with_location(location)
                .with_stack(backtrace);
            if matches!(recovery::catch(false, || page.execute_result(ctx)), Ok(Ok(()))) {
                return;
            }
            ctx.response_mut().reset();
        }
        self.write_fallback(ctx, GenericResult::error("Internal Server Error"));
    }

    fn write_fallback(&self, ctx: &mut HttpContext, result: GenericResult) {
        result.write_to(ctx.response_mut());
    }
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("routes", &self.routes.len())
            .field("middlewares", &self.middlewares)
            .field("debug", &self.config.debug)
            .finish_non_exhaustive()
    }
}
