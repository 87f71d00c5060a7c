use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Environment variable whose filter directives override the configured level
pub const LOG_ENV_VAR: &str = "SCHEMA_AST_LOG";

/// Tracing verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    #[default]
    Warn,
    /// Per-root progress
    Info,
    /// Traversal decisions
    Debug,
    /// Everything
    Trace,
}

impl FromStr for TracingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Invalid tracing level '{s}'. Valid levels are: error, warn, info, debug, trace"
            )),
        }
    }
}

impl TracingLevel {
    /// Lower-case name of the level
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Filter from `directives` when they parse, otherwise from `fallback`
fn env_filter(directives: Option<&str>, fallback: TracingLevel) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback.as_str()))
}

/// Install a global subscriber writing to stderr at `level`, unless [`LOG_ENV_VAR`] holds
/// valid filter directives.
///
/// Only binaries call this; the library just emits events.
pub fn init_tracing(level: TracingLevel) {
    let directives = std::env::var(LOG_ENV_VAR).ok();
    let filter = env_filter(directives.as_deref(), level);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    Registry::default().with(filter).with(stderr_layer).init();

    match directives {
        Some(directives) if EnvFilter::try_new(&directives).is_err() => {
            tracing::warn!("Ignoring {LOG_ENV_VAR}={directives}, using level {}", level.as_str());
        }
        Some(directives) => tracing::debug!("Tracing filter set from {LOG_ENV_VAR}: {directives}"),
        None => tracing::debug!("Tracing level set to: {}", level.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("DEBUG".parse::<TracingLevel>(), Ok(TracingLevel::Debug));
        assert_eq!("warn".parse::<TracingLevel>(), Ok(TracingLevel::Warn));
        assert!("loud".parse::<TracingLevel>().is_err());
    }

    #[test]
    fn test_env_directives_override_configured_level() {
        let filter = env_filter(Some("debug"), TracingLevel::Warn);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = env_filter(Some("schema_ast=trace"), TracingLevel::Warn);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_configured_level_without_valid_directives() {
        let filter = env_filter(None, TracingLevel::Info);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));

        let filter = env_filter(Some("schema_ast=loud"), TracingLevel::Error);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
        assert_eq!(TracingLevel::default(), TracingLevel::Warn);
    }
}
