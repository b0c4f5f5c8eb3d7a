//! Stage folding and order composition.

use std::sync::Arc;

use crate::filter::{Filter, FilterStage, HookResult};
use crate::http::HttpContext;

/// Run one stage over `filters` in order. Stops at the first filter that
/// returns an error or a result, or that cancels the request. An error wins
/// over a cancellation raised by the same filter.
pub fn run_filters(ctx: &mut HttpContext, filters: &[Arc<dyn Filter>], stage: FilterStage) -> HookResult {
    for (index, filter) in filters.iter().enumerate() {
        let outcome = match stage {
            FilterStage::ActionExecuting => filter.on_action_executing(ctx),
            FilterStage::ActionExecuted => filter.on_action_executed(ctx),
            FilterStage::ResultExecuting => filter.on_result_executing(ctx),
            FilterStage::ResultExecuted => filter.on_result_executed(ctx),
        };
        match outcome {
            Ok(None) if !ctx.is_canceled() => continue,
            Ok(None) => {
                tracing::debug!(stage = %stage, filter = index, "Request canceled by filter");
                return Ok(None);
            }
            Ok(Some(result)) => {
                tracing::debug!(stage = %stage, filter = index, "Filter produced a result");
                return Ok(Some(result));
            }
            Err(err) => {
                tracing::debug!(stage = %stage, filter = index, error = %err, "Filter failed");
                return Err(err);
            }
        }
    }
    Ok(None)
}

/// Controller filters, then action filters.
pub fn executing_order(controller: &[Arc<dyn Filter>], action: &[Arc<dyn Filter>]) -> Vec<Arc<dyn Filter>> {
    controller.iter().chain(action).cloned().collect()
}

/// Action filters, then controller filters.
pub fn executed_order(controller: &[Arc<dyn Filter>], action: &[Arc<dyn Filter>]) -> Vec<Arc<dyn Filter>> {
    action.iter().chain(controller).cloned().collect()
}
