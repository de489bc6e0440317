//! Tracing bootstrap for every binary in the workspace.
//!
//! `RUST_LOG` takes precedence over the configured `telemetry.log_filter`.

use bookapi_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG`, falling back to the configured directive
pub fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(settings));

    match settings.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    tracing::info!(
        target: "bookapi-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let settings = TelemetrySettings {
            log_format: LogFormat::Json,
            log_filter: "warn,bookapi_db=debug".to_string(),
        };

        let filter = env_filter(&settings).to_string();
        assert!(filter.contains("bookapi_db=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn second_init_is_an_error() {
        let settings = TelemetrySettings::default();
        let _ = init(&settings);

        assert!(init(&settings).is_err());
    }
}
