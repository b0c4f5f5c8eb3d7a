//! Action filters.
//!
//! # Responsibilities
//! - Define the four hooks that run around an action
//! - Compose controller and action filter lists in stage order
//! - Fold a filter list over one stage with early termination
//!
//! # Design Decisions
//! - A filter implements only the hooks it needs; the rest default to no-op
//! - Filters are shared by `Arc` and never mutated by the dispatcher
//! - Controller filters wrap action filters: `[C.., A..]` on the way in,
//!   `[A.., C..]` on the way out

pub mod runner;

use crate::http::{BoxedResult, HttpContext};
use crate::BoxError;

pub use runner::{executed_order, executing_order, run_filters};

/// What a hook hands back. `Ok(None)` lets the pipeline continue.
pub type HookResult = Result<Option<BoxedResult>, BoxError>;

/// The stage a filter hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStage {
    ActionExecuting,
    ActionExecuted,
    ResultExecuting,
    ResultExecuted,
}

impl FilterStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActionExecuting => "action_executing",
            Self::ActionExecuted => "action_executed",
            Self::ResultExecuting => "result_executing",
            Self::ResultExecuted => "result_executed",
        }
    }
}

impl std::fmt::Display for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cross-cutting hook around action execution.
pub trait Filter: Send + Sync {
    /// Before the handler runs.
    fn on_action_executing(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }

    /// After the handler returned, before its result is executed.
    fn on_action_executed(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }

    fn on_result_executing(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }

    /// After the action result was written to the response.
    fn on_result_executed(&self, _ctx: &mut HttpContext) -> HookResult {
        Ok(None)
    }
}
