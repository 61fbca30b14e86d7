//! Logging for Voxgate
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a
//! `fmt` layer in text or JSON form

use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};
use voxgate_config::{LogFormat, TelemetryConfig};

/// Build the log filter
///
/// `RUST_LOG` takes precedence, then the configured filter, then `fallback`.
/// An unparsable directive degrades to `info` instead of failing startup.
pub fn build_filter(config: Option<&TelemetryConfig>, fallback: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directive = config.map_or(fallback, |c| c.log_filter.as_str());

    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging from configuration
///
/// Must be called once, before the server starts handling requests.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>, fallback: &str) -> anyhow::Result<()> {
    let filter = build_filter(config, fallback);
    let format = config.map(|c| c.format).unwrap_or_default();

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_used() {
        temp_env::with_var_unset("RUST_LOG", || {
            let config = TelemetryConfig {
                log_filter: "tts=debug".to_string(),
                format: LogFormat::Text,
            };
            let filter = build_filter(Some(&config), "info");
            assert_eq!(filter.to_string(), "tts=debug");
        });
    }

    #[test]
    fn rust_log_wins_over_config() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let config = TelemetryConfig::default();
            let filter = build_filter(Some(&config), "info");
            assert_eq!(filter.to_string(), "warn");
        });
    }

    #[test]
    fn fallback_when_unconfigured() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(build_filter(None, "debug").to_string(), "debug");
        });
    }
}
