//! Tracing subscriber bootstrap for Bookshelf binaries.

use anyhow::Context;
use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` when present, otherwise the configured directives.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => configured_filter(settings),
    }
}

/// Parse `telemetry.filter` alone.
pub fn configured_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(&settings.filter)
        .with_context(|| format!("invalid telemetry.filter '{}'", settings.filter))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(
            target: "bookshelf-telemetry",
            format = ?settings.log_format,
            "tracing subscriber installed"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let settings = TelemetrySettings {
            log_format: LogFormat::Pretty,
            filter: "bookshelf=verbose".to_string(),
        };
        let err = configured_filter(&settings).unwrap_err();
        assert!(err.to_string().contains("bookshelf=verbose"));
    }

    #[test]
    fn default_filter_parses() {
        configured_filter(&TelemetrySettings::default()).unwrap();
    }

    #[test]
    fn init_twice_is_harmless() {
        let settings = TelemetrySettings::default();
        init(&settings).unwrap();
        init(&settings).unwrap();
    }
}
