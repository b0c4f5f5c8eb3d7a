//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that sends every path to the MVC handler
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Bind server to listener and shut down gracefully
//! - Log and record metrics for every request once its response is flushed
//!
//! # Design Decisions
//! - The body is read in full before the pipeline runs; the pipeline itself
//!   is synchronous and never touches the socket
//! - Exactly one response leaves per request, produced by the context flush

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::dispatch::RequestHandler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::observability::metrics;

/// HTTP host for a frozen [`RequestHandler`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        let router = Self::build_router(handler);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(handler: Arc<RequestHandler>) -> Router {
        let server = &handler.config().server;
        let timeout = Duration::from_secs(server.request_timeout_secs);
        let max_body = server.max_body_bytes;

        Router::new()
            .route("/", any(mvc_handler))
            .route("/{*path}", any(mvc_handler))
            .with_state(handler)
            .layer(RequestBodyLimitLayer::new(max_body))
            .layer(TimeoutLayer::new(timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for embedding into another Axum application.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Runs the MVC pipeline for one request.
async fn mvc_handler(State(handler): State<Arc<RequestHandler>>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();

    let body: Bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read request body");
            metrics::record_request(&method, StatusCode::PAYLOAD_TOO_LARGE.as_u16(), "none", start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let mut ctx = handler.new_context(parts.method, parts.uri, parts.headers, body);
    tracing::debug!(
        request_id = ctx.request_id().unwrap_or("unknown"),
        method = %ctx.method(),
        path = %ctx.path(),
        "Dispatching request"
    );

    handler.handle(&mut ctx);

    let route = ctx
        .route_data()
        .map(|rd| rd.route.name().to_string())
        .unwrap_or_else(|| "none".to_string());
    let request_id = ctx.request_id().unwrap_or("unknown").to_string();
    let path = ctx.path().to_string();
    let response = ctx.into_response().await;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route,
        status = response.status().as_u16(),
        elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "Request finished"
    );
    metrics::record_request(&method, response.status().as_u16(), &route, start_time);
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
