use std::net::SocketAddr;

use anyhow::Context;

pub const ENV_BIND: &str = "TASKDESK_BIND";
const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub bind: SocketAddr,
}

impl DemoConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(ENV_BIND)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = raw
            .trim()
            .parse()
            .with_context(|| format!("{ENV_BIND}: invalid socket address '{raw}'"))?;
        Ok(Self { bind })
    }
}
