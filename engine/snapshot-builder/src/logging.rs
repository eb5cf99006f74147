//! Logging and tracing setup

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt, EnvFilter,
};

/// Initialize logging from `RUST_LOG`, defaulting to `info`
pub fn initialize_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(false).with_ansi(true);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    Ok(())
}

/// Initialize logging with an explicit level and format
pub fn initialize_logging_with_config(level: &str, format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(level)?;

    let fmt_layer = match format {
        "json" => fmt::layer().json().with_target(true).with_file(true).with_line_number(true).boxed(),
        "pretty" => fmt::layer()
            .pretty()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .boxed(),
        _ => fmt::layer().with_target(false).with_ansi(true).boxed(),
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    Ok(())
}

/// Initialize logging for an entry point; `RUST_LOG` overrides the configured level
pub fn initialize_from_config(config: &LoggingConfig) -> Result<()> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        initialize_logging()
    } else {
        initialize_logging_with_config(&config.level, &config.format)
    }
}
