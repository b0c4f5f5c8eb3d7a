//! A single route and the data produced by matching it.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::matcher;
use crate::routing::pattern::{self, CompiledPattern};

/// Errors raised while building a route. These are setup-time failures and
/// never occur while serving requests.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route name must be set")]
    EmptyName,

    #[error("route `{0}`: pattern must be set")]
    EmptyPattern(String),

    #[error("route `{route}`: parameter name `{param}` must start with a letter or `_` and may only contain letters, digits and `_`")]
    InvalidParamName { route: String, param: String },

    #[error("route `{route}`: invalid pattern: {source}")]
    InvalidPattern {
        route: String,
        #[source]
        source: regex::Error,
    },
}

/// A URL template with defaults and constraints.
///
/// ```
/// use trellis::routing::Route;
///
/// let mut route = Route::new("default", "/{controller}/{action}/{id}")
///     .with_default("controller", "home")
///     .with_default("action", "index")
///     .with_default("id", "0")
///     .with_constraint("id", r"\d+");
/// route.compile().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: String,
    defaults: HashMap<String, String>,
    constraints: HashMap<String, String>,
    is_static: bool,
    compiled: Option<CompiledPattern>,
}

impl Route {
    /// A controller/action route.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            defaults: HashMap::new(),
            constraints: HashMap::new(),
            is_static: false,
            compiled: None,
        }
    }

    /// A file-serving route. The first capture group of `pattern`, if any,
    /// is the path relative to the static root.
    pub fn static_files(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::new(name, pattern)
        }
    }

    pub fn with_default(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(param.into(), value.into());
        self
    }

    pub fn with_defaults<I, K, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults
            .extend(defaults.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_constraint(mut self, param: impl Into<String>, regex: impl Into<String>) -> Self {
        self.constraints.insert(param.into(), regex.into());
        self
    }

    pub fn with_constraints<I, K, V>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.constraints
            .extend(constraints.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Build a route from its config file form.
    pub fn from_config(config: &RouteConfig) -> Self {
        let route = if config.is_static {
            Self::static_files(&config.name, &config.pattern)
        } else {
            Self::new(&config.name, &config.pattern)
        };
        route
            .with_defaults(config.defaults.clone())
            .with_constraints(config.constraints.clone())
    }

    /// Compile the template. Calling this again after a successful compile
    /// does nothing.
    pub fn compile(&mut self) -> Result<(), RouteError> {
        if self.compiled.is_some() {
            return Ok(());
        }
        if self.name.is_empty() {
            return Err(RouteError::EmptyName);
        }
        if self.pattern.is_empty() {
            return Err(RouteError::EmptyPattern(self.name.clone()));
        }
        self.compiled = Some(pattern::compile(
            &self.name,
            &self.pattern,
            &self.defaults,
            &self.constraints,
        )?);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn defaults(&self) -> &HashMap<String, String> {
        &self.defaults
    }

    pub fn constraints(&self) -> &HashMap<String, String> {
        &self.constraints
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// The compiled expression, once [`Route::compile`] has succeeded.
    pub fn compiled(&self) -> Option<&CompiledPattern> {
        self.compiled.as_ref()
    }

    /// Match `url` against this route. An uncompiled route never matches.
    ///
    /// Static routes only ever produce a file path; dynamic routes only ever
    /// produce a controller/action pair.
    pub fn match_url(self: &Arc<Self>, url: &str) -> Option<RouteData> {
        let compiled = self.compiled.as_ref()?;
        if self.is_static {
            return self.match_static(compiled, url);
        }

        let mut groups = matcher::named_groups(compiled.regex(), url)?;
        for (param, value) in &self.defaults {
            let slot = groups.entry(param.clone()).or_default();
            if slot.is_empty() {
                slot.clone_from(value);
            }
        }

        let controller = groups.remove("controller").unwrap_or_default();
        let action = groups.remove("action").unwrap_or_default();
        if controller.is_empty() || action.is_empty() {
            return None;
        }

        Some(RouteData {
            url: url.to_string(),
            route: Arc::clone(self),
            controller,
            action,
            params: groups,
            file_path: None,
        })
    }

    fn match_static(self: &Arc<Self>, compiled: &CompiledPattern, url: &str) -> Option<RouteData> {
        let file_path = matcher::static_path(compiled.regex(), url)?;
        Some(RouteData {
            url: url.to_string(),
            route: Arc::clone(self),
            controller: String::new(),
            action: String::new(),
            params: HashMap::new(),
            file_path: Some(file_path),
        })
    }
}

/// The outcome of a successful match. Created per request and read-only
/// afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RouteData {
    pub url: String,
    #[serde(serialize_with = "serialize_route_name")]
    pub route: Arc<Route>,
    pub controller: String,
    pub action: String,
    pub params: HashMap<String, String>,
    /// Path relative to the static root, set for static routes only.
    pub file_path: Option<String>,
}

impl RouteData {
    /// A named parameter other than `controller`/`action`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn is_static(&self) -> bool {
        self.route.is_static()
    }
}

fn serialize_route_name<S: Serializer>(route: &Arc<Route>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(route.name())
}
