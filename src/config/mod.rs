//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc with the request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table and controller
//!   registry built from it are frozen before serving starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::LogConfig;
pub use schema::LogLevel;
pub use schema::ObservabilityConfig;
pub use schema::PathsConfig;
pub use schema::RouteConfig;
pub use schema::ServerConfig;
pub use validation::ValidationError;
