//! Tracing subscriber setup for applications embedding the gateway.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the application, which may call [`init_tracing`] once at startup.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{GatewayError, Result};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "PAGARME_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for development.
    #[default]
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

impl LogFormat {
    /// Reads `PAGARME_LOG_FORMAT`; unset or unknown values yield
    /// [`Pretty`](Self::Pretty).
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_FORMAT_ENV).unwrap_or_default())
    }

    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Installs a global subscriber with an `EnvFilter` (`RUST_LOG`, default
/// `info`) and the chosen output layer, writing to stderr.
///
/// # Errors
///
/// Returns [`GatewayError::ConfigError`] if a global subscriber is already
/// installed.
///
/// # Examples
///
/// ```no_run
/// use pagarme_gateway::observability::{LogFormat, init_tracing};
///
/// init_tracing(LogFormat::from_env()).unwrap();
/// ```
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| GatewayError::ConfigError(format!("cannot install tracing subscriber: {e}")))
}
