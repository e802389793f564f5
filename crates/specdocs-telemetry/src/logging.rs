//! Structured logging to stdout, JSON or pretty.

use crate::{LogFormat, TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Standard log event names.
pub mod events {
    /// Service is starting up.
    pub const STARTUP: &str = "startup";

    /// Service is shutting down.
    pub const SHUTDOWN: &str = "shutdown";

    /// Documentation templates have been parsed.
    pub const TEMPLATES_LOADED: &str = "templates_loaded";

    /// Service is listening on a port.
    pub const LISTENING: &str = "listening";

    /// A remote spec document was retrieved.
    pub const SPEC_FETCHED: &str = "spec_fetched";

    /// A spec was routed to a rejection template.
    pub const SPEC_REJECTED: &str = "spec_rejected";

    /// A documentation request failed in one of the pipeline stages.
    pub const PIPELINE_FAILED: &str = "pipeline_failed";
}

#[macro_export]
macro_rules! log_startup {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::STARTUP,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_shutdown {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::SHUTDOWN,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_templates_loaded {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::TEMPLATES_LOADED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_listening {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::LISTENING,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_spec_fetched {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::SPEC_FETCHED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_spec_rejected {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::SPEC_REJECTED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_pipeline_failed {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::PIPELINE_FAILED,
            $($field)*
        )
    };
}
