// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Output encoding of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per event.
    Json,
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes the global `tracing` subscriber and routes `log` records into it.
///
/// Logs go to stderr so that command output on stdout stays machine-readable.
/// Fails if a global subscriber or logger is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), anyhow::Error> {
    let (json_layer, plain_layer) = match format {
        LogFormat::Json => (
            Some(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            ),
            None,
        ),
        LogFormat::Plain => (
            None,
            Some(fmt::layer().with_writer(std::io::stderr).with_target(true)),
        ),
    };
    let subscriber = Registry::default()
        .with(default_filter())
        .with(json_layer)
        .with(plain_layer);
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        assert!(init_tracing(LogFormat::Json).is_ok());
        assert!(init_tracing(LogFormat::Plain).is_err());
    }
}
