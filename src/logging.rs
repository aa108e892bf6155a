//! Log subscriber for the CLI and embedding hosts.
//!
//! `RUST_LOG` filters; `BCH_BRIDGE_LOG_JSON=1` switches to JSON lines. Output goes to
//! stderr so stdout stays clean for command results.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat { Pretty, Json }

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("BCH_BRIDGE_LOG_JSON") {
            Ok(value) if value == "1" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Installs the global subscriber at `info`. A second call is a no-op.
pub fn init_logging() { init_logging_with(LogFormat::from_env(), "info") }

/// `default_filter` applies only when `RUST_LOG` is unset or unparsable.
pub fn init_logging_with(format: LogFormat, default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt::Subscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
