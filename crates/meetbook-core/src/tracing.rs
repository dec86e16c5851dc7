//! Tracing setup for meetbook binaries.
//!
//! Call [`init_tracing`] once at process start; `RUST_LOG` overrides the
//! configured default level.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set the global subscriber (already initialized).
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse an env filter directive.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default level when `RUST_LOG` is not set.
    pub default_level: Level,
    /// Emit JSON lines instead of the compact human format.
    pub json: bool,
    /// Include the module path in log lines.
    pub include_target: bool,
    /// Explicit env filter directive, overriding `default_level`.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            json: false,
            include_target: true,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Config for interactive debugging.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            ..Self::default()
        }
    }

    /// Set the output to JSON lines (for service deployments).
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Set an explicit env filter directive.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Initializes the global tracing subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been set or the filter directive
/// does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = if let Some(ref filter) = config.env_filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()))
    };

    if config.json {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(config.include_target));
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(config.include_target));
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
