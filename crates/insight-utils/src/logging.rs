//! Logging and tracing utilities

use crate::{LogConfig, LogFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(&LogConfig::default());
}

/// Initialize tracing subscriber from a [`LogConfig`]
///
/// `RUST_LOG` takes precedence over `config.default_filter`. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing_with(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match (config.format, config.stderr) {
        (LogFormat::Fmt, true) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Fmt, false) => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        (LogFormat::Json, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (LogFormat::Json, false) => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    if let Err(err) = result {
        tracing::debug!("tracing already initialised: {err}");
    }
}
