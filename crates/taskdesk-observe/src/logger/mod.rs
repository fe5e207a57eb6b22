mod config;
mod error;
mod format;
mod log;

pub use config::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, LoggerConfig};
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global `tracing` subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] when called twice.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    log::install(cfg)
}
