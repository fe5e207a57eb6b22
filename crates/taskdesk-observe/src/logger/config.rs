use std::io::IsTerminal;

use crate::logger::{error::LoggerError, format::LoggerFormat};

/// Environment variable holding the level / `EnvFilter` directives.
pub const ENV_LOG_LEVEL: &str = "TASKDESK_LOG";
/// Environment variable holding the output format (`text`, `json`, `journald`).
pub const ENV_LOG_FORMAT: &str = "TASKDESK_LOG_FORMAT";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Level or `EnvFilter` directives, e.g. `"info,taskdesk_core=debug"`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    /// Defaults overridden by `TASKDESK_LOG` and `TASKDESK_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, LoggerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](LoggerConfig::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            cfg.level = level.trim().to_string();
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT).filter(|v| !v.trim().is_empty()) {
            cfg.format = format.parse()?;
        }
        if cfg.format == LoggerFormat::Json {
            cfg.use_color = false;
        }
        Ok(cfg)
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
        }
    }
}
