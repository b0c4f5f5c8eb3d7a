//! The TOML document an application starts from.
//!
//! Every section and field has a default, so an empty file is a valid
//! (route-less) configuration. `[[routes]]` entries are compiled into the
//! route table at setup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration for an application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Show detailed diagnostics (message, stack, environment) for failures.
    pub debug: bool,

    /// Listener and request limits.
    pub server: ServerConfig,

    /// Directory layout for static assets and views.
    pub paths: PathsConfig,

    /// Log verbosity.
    pub log: LogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, in match priority order.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Filesystem layout of the application.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Project root directory.
    pub root_dir: PathBuf,

    /// Static file directory, relative to `root_dir`.
    pub static_path: String,

    /// View directory, relative to `root_dir`.
    pub view_path: String,

    /// File extension of view templates.
    pub view_extension: String,

    /// Cache view lookups and parsed templates.
    pub cache_views: bool,
}

impl PathsConfig {
    /// Absolute-or-relative directory static routes serve from.
    pub fn static_root(&self) -> PathBuf {
        self.root_dir.join(&self.static_path)
    }

    /// Directory views are looked up in.
    pub fn view_root(&self) -> PathBuf {
        self.root_dir.join(&self.view_path)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            static_path: "static".to_string(),
            view_path: "views".to_string(),
            view_extension: "html".to_string(),
            cache_views: true,
        }
    }
}

/// Log verbosity, ordered from quietest to most verbose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    #[default]
    Error,
    Warn,
    Notice,
    Log,
}

impl LogLevel {
    /// The `tracing` filter directive matching this level.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Notice => "info",
            LogLevel::Log => "debug",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Verbosity threshold.
    pub level: LogLevel,

    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address of the scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A route as written in a config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// URL template, e.g. `/{controller}/{action}/{id}`.
    pub pattern: String,

    /// Default values for placeholders.
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    /// Regex fragments restricting placeholders.
    #[serde(default)]
    pub constraints: HashMap<String, String>,

    /// Serve files instead of dispatching to a controller.
    #[serde(default)]
    pub is_static: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(!config.debug);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.paths.static_path, "static");
        assert_eq!(config.log.level, LogLevel::Error);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_routes_table() {
        let doc = r#"
            debug = true

            [log]
            level = "notice"

            [[routes]]
            name = "static"
            pattern = "/static/(.*)"
            is_static = true

            [[routes]]
            name = "default"
            pattern = "/{controller}/{action}/{id}"
            defaults = { controller = "home", action = "index", id = "0" }
            constraints = { id = "\\d+" }
        "#;
        let config: AppConfig = toml::from_str(doc).unwrap();
        assert!(config.debug);
        assert_eq!(config.log.level, LogLevel::Notice);
        assert_eq!(config.routes.len(), 2);
        assert!(config.routes[0].is_static);
        assert_eq!(config.routes[1].defaults["controller"], "home");
        assert_eq!(config.routes[1].constraints["id"], "\\d+");
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Log > LogLevel::Error);
        assert!(LogLevel::Error > LogLevel::Off);
        assert_eq!(LogLevel::Notice.as_filter(), "info");
    }

    #[test]
    fn test_path_helpers() {
        let paths = PathsConfig {
            root_dir: PathBuf::from("/srv/app"),
            ..Default::default()
        };
        assert_eq!(paths.static_root(), PathBuf::from("/srv/app/static"));
        assert_eq!(paths.view_root(), PathBuf::from("/srv/app/views"));
    }
}
