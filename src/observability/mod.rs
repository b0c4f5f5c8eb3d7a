//! Logs and metrics for the dispatcher.
//!
//! # Data Flow
//! ```text
//! server, pipeline, RequestLogMiddleware
//!     → logging.rs  (tracing events; text or JSON lines on stdout)
//!     → metrics.rs  (request count/latency by route, recovered failures)
//!         → optional Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - The subscriber level comes from `RUST_LOG` first, then `[log] level`
//! - Failure log lines carry the request id
//! - Recording a metric without an installed exporter is a no-op

pub mod logging;
pub mod metrics;
