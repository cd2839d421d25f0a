//! Logging setup for the application.

use crate::config::{AppConfig, LogLevel};
use env_logger::Builder;
use log::LevelFilter;

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::Trace,
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// Initializes the logger from the application settings.
///
/// `--log-level` sets the default level; module directives in `RUST_LOG`
/// are applied on top of it, so `RUST_LOG=wfc_core=debug` still narrows in
/// on the solver. Calling this twice is harmless.
pub fn init_logger(config: &AppConfig) {
    let mut builder = Builder::new();
    builder.filter_level(config.log_level.into());
    if let Ok(directives) = std::env::var("RUST_LOG") {
        builder.parse_filters(&directives);
    }

    if builder.try_init().is_ok() {
        log::debug!("Logger initialized with log level: {:?}", config.log_level);
    }
}
