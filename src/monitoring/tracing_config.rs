//! Structured logging with tracing
//!
//! Sets up:
//! - Console logging on stderr (text or JSON)
//! - File logging with daily rotation, always JSON
//! - Level filtering from RUST_LOG

use super::config::{LogFormat, MonitoringConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Initialize the global tracing subscriber.
///
/// Returns the file writer guard when file logging is on; it must be kept
/// alive for the duration of the program or buffered lines are lost.
pub fn init_tracing(config: &MonitoringConfig) -> std::io::Result<Option<WorkerGuard>> {
    if !config.enabled {
        return Ok(None);
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if config.enable_console_logging {
        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true);
        match config.log_format {
            LogFormat::Json => layers.push(console.json().boxed()),
            LogFormat::Text => layers.push(console.boxed()),
        }
    }

    if config.enable_file_logging {
        config.ensure_log_dir()?;
        let file_appender = daily(&config.log_dir, "docaid.log");
        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
        layers.push(
            fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .json()
                .boxed(),
        );
        guard = Some(file_guard);
    }

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_initialization() {
        let config = MonitoringConfig::default();
        assert!(init_tracing(&config).is_ok());
    }

    #[test]
    fn test_tracing_disabled() {
        let config = MonitoringConfig {
            enabled: false,
            ..MonitoringConfig::default()
        };
        assert!(init_tracing(&config).unwrap().is_none());
    }

    #[test]
    fn test_file_logging_returns_guard() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MonitoringConfig {
            enable_file_logging: true,
            enable_console_logging: false,
            log_dir: tmp.path().to_path_buf(),
            ..MonitoringConfig::default()
        };
        assert!(init_tracing(&config).unwrap().is_some());
    }
}
