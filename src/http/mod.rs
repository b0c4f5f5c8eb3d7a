//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, body read)
//!     → context.rs (HttpContext built for the pipeline)
//!     → dispatch (middleware, routing, filters, action)
//!     → result.rs (action result executed into the response buffer)
//!     → response.rs (single flush to the client)
//! ```

pub mod context;
pub mod request;
pub mod response;
pub mod result;
pub mod server;

pub use context::HttpContext;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ResponseBuffer;
pub use result::{ActionResult, BoxedResult, FileResult, GenericResult, ViewResult};
pub use server::HttpServer;
