//! Logger initialisation for taskdesk binaries.
//!
//! ```no_run
//! use taskdesk_observe::{LoggerConfig, logger_init};
//!
//! logger_init(&LoggerConfig::from_env()?)?;
//! tracing::info!("logger initialized");
//! # Ok::<(), taskdesk_observe::LoggerError>(())
//! ```

mod logger;
pub use logger::*;
