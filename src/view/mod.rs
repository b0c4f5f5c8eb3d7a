//! View rendering collaborators.
//!
//! # Data Flow
//! ```text
//! ViewResult (controller, action, view name, layout, data)
//!     → ViewEngine::render
//!         → lookup view file (cached)
//!         → TemplateEngine::render(view) → body
//!         → optional: TemplateEngine::render(layout, data + body)
//!     → bytes written into the result body
//! ```
//!
//! # Design Decisions
//! - The dispatcher only sees the two traits; template syntax is not its concern
//! - Lookup and render failures are errors distinct from an empty render
//! - Lookup caches are concurrent maps filled on miss

pub mod engine;
pub mod template;

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

pub use engine::DefaultViewEngine;
pub use template::PlaceholderTemplateEngine;

/// Failure to produce a view.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no view engine is configured")]
    NoViewEngine,

    #[error("can't find the view for {{controller: {controller}, action: {action}, view: {view}}}, looked up: {searched:?}")]
    ViewNotFound {
        controller: String,
        action: String,
        view: String,
        searched: Vec<PathBuf>,
    },

    #[error("can't find layout `{layout}`, looked up: {searched:?}")]
    LayoutNotFound {
        layout: String,
        searched: Vec<PathBuf>,
    },

    #[error("reading template {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {path:?}: {message}")]
    Template { path: PathBuf, message: String },
}

/// What to render.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewRequest<'a> {
    pub controller: &'a str,
    pub action: &'a str,
    /// Defaults to the action name.
    pub view_name: Option<&'a str>,
    pub layout: Option<&'a str>,
}

impl ViewRequest<'_> {
    /// The view name actually looked up.
    pub fn view(&self) -> &str {
        self.view_name.unwrap_or(self.action)
    }
}

/// Renders a template file with a data payload.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, path: &std::path::Path, data: &Value, sink: &mut Vec<u8>) -> Result<(), RenderError>;
}

/// Resolves views by controller/action/name and renders them.
pub trait ViewEngine: Send + Sync {
    fn lookup_view(&self, controller: &str, action: &str, view_name: &str) -> Result<PathBuf, RenderError>;

    fn render(&self, request: &ViewRequest<'_>, data: &Value, sink: &mut Vec<u8>) -> Result<(), RenderError>;
}
