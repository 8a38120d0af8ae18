//! Tracing initialization.
//!
//! Logs go to stdout through `tracing-subscriber`, either human-readable or as JSON lines
//! depending on [`LogFormat`]. The filter is taken from `RUST_LOG` and defaults to `info`,
//! e.g. `RUST_LOG=textpin=debug,tower_http=debug`.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogFormat;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init()?,
    }

    info!(?format, "Telemetry initialized");
    Ok(())
}
