//! Controller registration.
//!
//! # Responsibilities
//! - Map (controller, method, action) to a handler closure
//! - Hold controller-level and action-level filter lists
//! - Reject conflicting registrations while the application is set up
//!
//! # Design Decisions
//! - Keys are `{method}_{action}`, lowercased; method `all` is stored as
//!   the empty string and acts as a fallback
//! - A method-specific action always wins over the wildcard
//! - The factory is built once and frozen inside the request handler

pub mod builder;
pub mod registry;

use std::sync::Arc;
use thiserror::Error;

use crate::http::{BoxedResult, HttpContext};
use crate::BoxError;

pub use builder::ControllerBuilder;
pub use registry::{ActionInfo, ControllerFactory, ControllerInfo, ResolvedAction, ALL_METHODS};

/// What an action handler returns.
pub type ActionOutcome = Result<BoxedResult, BoxError>;

/// A registered action handler.
pub type ActionHandler = Arc<dyn Fn(&mut HttpContext) -> ActionOutcome + Send + Sync>;

/// Errors raised while registering controllers.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("action {method} {controller}/{action} is already registered")]
    DuplicateAction {
        method: String,
        controller: String,
        action: String,
    },

    #[error("action {method} {controller}/{action} is not registered")]
    UnknownAction {
        method: String,
        controller: String,
        action: String,
    },
}
