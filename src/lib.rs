//! Request routing and dispatch core for an MVC web framework.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ────────────────▶ http::server ──▶ dispatch::RequestHandler
//!                                          │
//!                                          ├─ middleware (begin request)
//!                                          ├─ routing::RouteTable ──▶ RouteData
//!                                          ├─ static route ──▶ FileResult
//!                                          ├─ middleware (begin mvc)
//!                                          ├─ controller::ControllerFactory
//!                                          │     └─ filter chain ⟷ action handler
//!                                          ├─ middleware (end mvc, end request)
//!                                          └─ http::result ──▶ ResponseBuffer
//!     Client Response                                              │
//!     ◀────────────────────────────────────── single flush ◀───────┘
//! ```
//!
//! Setup happens once through [`app::Application`], which freezes routes,
//! controllers and middlewares into a shared [`dispatch::RequestHandler`].

// Core subsystems
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod filter;
pub mod http;
pub mod middleware;
pub mod routing;
pub mod view;

// Setup and cross-cutting concerns
pub mod app;
pub mod observability;

/// Error type returned by handlers, filters and middlewares.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use app::{Application, SetupError};
pub use config::AppConfig;
pub use dispatch::RequestHandler;
pub use http::{HttpContext, HttpServer};
