//! Shared utilities for integration testing.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use trellis::filter::{Filter, FilterStage, HookResult};
use trellis::http::HttpContext;
use trellis::middleware::Middleware;
use trellis::routing::Route;
use trellis::{AppConfig, Application, HttpServer, RequestHandler};

/// Ordered record of hook invocations, shared between probes.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries starting with `prefix`, prefix stripped.
    pub fn stage(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_string))
            .collect()
    }
}

/// What a probe does when its hook fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Outcome {
    Pass,
    Cancel,
    Result,
    Fail,
}

/// Filter that records each hook as `{stage}:{name}` and reacts with
/// `outcome` at stage `at`.
pub struct RecordingFilter {
    pub name: &'static str,
    pub log: CallLog,
    pub at: FilterStage,
    pub outcome: Outcome,
}

#[allow(dead_code)]
impl RecordingFilter {
    pub fn new(name: &'static str, log: &CallLog) -> Arc<dyn Filter> {
        Self::with_outcome(name, log, Outcome::Pass)
    }

    /// Reacts in `on_action_executing`.
    pub fn with_outcome(name: &'static str, log: &CallLog, outcome: Outcome) -> Arc<dyn Filter> {
        Self::at_stage(name, log, FilterStage::ActionExecuting, outcome)
    }

    pub fn at_stage(name: &'static str, log: &CallLog, at: FilterStage, outcome: Outcome) -> Arc<dyn Filter> {
        Arc::new(Self {
            name,
            log: log.clone(),
            at,
            outcome,
        })
    }

    fn hook(&self, ctx: &mut HttpContext, stage: FilterStage) -> HookResult {
        self.log.push(format!("{stage}:{}", self.name));
        if stage == self.at {
            outcome(ctx, self.outcome, self.name)
        } else {
            Ok(None)
        }
    }
}

fn outcome(ctx: &mut HttpContext, outcome: Outcome, who: &str) -> HookResult {
    match outcome {
        Outcome::Pass => Ok(None),
        Outcome::Cancel => {
            ctx.cancel();
            Ok(None)
        }
        Outcome::Result => Ok(Some(ctx.html(format!("short-circuited by {who}")))),
        Outcome::Fail => Err(format!("{who} refused").into()),
    }
}

impl Filter for RecordingFilter {
    fn on_action_executing(&self, ctx: &mut HttpContext) -> HookResult {
        self.hook(ctx, FilterStage::ActionExecuting)
    }

    fn on_action_executed(&self, ctx: &mut HttpContext) -> HookResult {
        self.hook(ctx, FilterStage::ActionExecuted)
    }

    fn on_result_executing(&self, ctx: &mut HttpContext) -> HookResult {
        self.hook(ctx, FilterStage::ResultExecuting)
    }

    fn on_result_executed(&self, ctx: &mut HttpContext) -> HookResult {
        self.hook(ctx, FilterStage::ResultExecuted)
    }
}

/// Middleware that records each hook as `{stage}:{name}`.
pub struct RecordingMiddleware {
    pub name: &'static str,
    pub log: CallLog,
    pub on_begin_request: Outcome,
}

impl Middleware for RecordingMiddleware {
    fn on_begin_request(&self, ctx: &mut HttpContext) -> HookResult {
        self.log.push(format!("begin_request:{}", self.name));
        outcome(ctx, self.on_begin_request, self.name)
    }

    fn on_begin_mvc_handle(&self, _ctx: &mut HttpContext) -> HookResult {
        self.log.push(format!("begin_mvc_handle:{}", self.name));
        Ok(None)
    }

    fn on_end_mvc_handle(&self, _ctx: &mut HttpContext) -> HookResult {
        self.log.push(format!("end_mvc_handle:{}", self.name));
        Ok(None)
    }

    fn on_end_request(&self, _ctx: &mut HttpContext) -> HookResult {
        self.log.push(format!("end_request:{}", self.name));
        Ok(None)
    }
}

/// An application with the static route and the default
/// `/{controller}/{action}/{id}` route registered.
pub fn app(config: AppConfig) -> Application {
    let mut app = Application::new(config);
    app.routes_mut().add_static("static", "/static/(.*)").unwrap();
    app.routes_mut()
        .add_route(
            Route::new("default", "/{controller}/{action}/{id}")
                .with_defaults([("controller", "home"), ("action", "index"), ("id", "0")])
                .with_constraint("id", r"\d+"),
        )
        .unwrap();
    app
}

/// Run one request through `handler` without a socket.
#[allow(dead_code)]
pub fn dispatch(handler: &RequestHandler, method: Method, uri: &str) -> HttpContext {
    let mut ctx = handler.new_context(method, uri.parse().unwrap(), HeaderMap::new(), Bytes::new());
    handler.handle(&mut ctx);
    ctx
}

#[allow(dead_code)]
pub fn body_text(ctx: &HttpContext) -> String {
    String::from_utf8(ctx.response().body().to_vec()).unwrap()
}

/// Serve `handler` on an ephemeral port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server(handler: Arc<RequestHandler>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = HttpServer::new(handler).run(listener).await;
    });
    format!("http://{addr}")
}
