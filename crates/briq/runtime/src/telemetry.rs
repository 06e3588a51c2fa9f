use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Install the global tracing subscriber.
///
/// Logs go to stderr. `RUST_LOG` wins over the configured level. Fails if a
/// subscriber is already installed.
pub fn init(logging: &LoggingConfig) -> RuntimeResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let result = if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| RuntimeError::Telemetry(e.to_string()))
}
