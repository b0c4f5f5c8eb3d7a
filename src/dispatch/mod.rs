//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! HttpContext
//!     → 1. middleware: begin_request
//!     → 2. route table match            (miss → 404)
//!     → 3. static route?                (yes → FileResult, stop)
//!     → 4. middleware: begin_mvc_handle
//!     → 5. controller dispatch
//!            a. resolve action          (miss → 404)
//!            b. filters: action_executing   [C.., A..]
//!            c. handler                 → raw result
//!            d. filters: action_executed    [A.., C..]
//!            e. filters: result_executing   [C.., A..]
//!            f. raw result executed
//!            g. filters: result_executed    [A.., C..]
//!     → 6. middleware: end_mvc_handle
//!     → 7. middleware: end_request
//!     → surviving result executed into the response buffer
//! ```
//!
//! # Design Decisions
//! - Every stage may stop the request with an error, a result, or by
//!   canceling; a stopped request never re-enters an earlier stage
//! - One recovery boundary wraps all of the above
//! - Hook errors become a plain 500 with the error text; panics and render
//!   failures become the diagnostic page in debug, an opaque 500 otherwise

pub mod diagnostic;
pub mod pipeline;
pub mod recovery;

pub use diagnostic::DiagnosticResult;
pub use pipeline::{PipelineError, RequestHandler};
pub use recovery::PanicReport;
