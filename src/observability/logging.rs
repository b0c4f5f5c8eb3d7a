//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from configuration
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level when set
//! - JSON lines when `log.json = true`, human readable output otherwise
//! - Installing twice is reported, not fatal (tests share one process)

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogLevel};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(level: LogLevel) -> EnvFilter {
    match level {
        LogLevel::Off => EnvFilter::new("off"),
        level => EnvFilter::new(format!("{lvl},tower_http={lvl}", lvl = level.as_filter())),
    }
}

/// Install the global subscriber.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config.level));
    let json = config.json.then(|| fmt::layer().json());
    let text = (!config.json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(LogLevel::Off).to_string().contains("off"));
        let notice = default_filter(LogLevel::Notice).to_string();
        assert!(notice.contains("tower_http=info"));
        assert!(!notice.contains("debug"));
    }
}
