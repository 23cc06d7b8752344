//! Server configuration from environment variables

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const BIND_VAR: &str = "TESLASENSE_BIND";
pub const POLL_INTERVAL_VAR: &str = "TESLASENSE_POLL_INTERVAL_SECS";
pub const WAKE_IF_ASLEEP_VAR: &str = "TESLASENSE_WAKE_IF_ASLEEP";

const DEFAULT_BIND: &str = "0.0.0.0:9200";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the REST API listens on
    pub bind_addr: SocketAddr,

    /// Time between polls of every registered sensor
    pub poll_interval: Duration,

    /// Wake sleeping cars when polling
    pub wake_if_asleep: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9200)),
            poll_interval: DEFAULT_POLL_INTERVAL,
            wake_if_asleep: false,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables; unset ones take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup(BIND_VAR)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| format!("invalid {}", BIND_VAR))?;

        let poll_interval = match lookup(POLL_INTERVAL_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid {}: {:?}", POLL_INTERVAL_VAR, raw))?;
                anyhow::ensure!(secs > 0, "{} must be at least 1", POLL_INTERVAL_VAR);
                Duration::from_secs(secs)
            }
            None => DEFAULT_POLL_INTERVAL,
        };

        let wake_if_asleep = match lookup(WAKE_IF_ASLEEP_VAR) {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("invalid {}: {:?}", WAKE_IF_ASLEEP_VAR, raw))?,
            None => false,
        };

        Ok(Self {
            bind_addr,
            poll_interval,
            wake_if_asleep,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(load(&[]).unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (BIND_VAR, "127.0.0.1:8080"),
            (POLL_INTERVAL_VAR, "30"),
            (WAKE_IF_ASLEEP_VAR, "True"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(config.wake_if_asleep);
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[(BIND_VAR, "not an address")]).is_err());
        assert!(load(&[(POLL_INTERVAL_VAR, "soon")]).is_err());
        assert!(load(&[(POLL_INTERVAL_VAR, "0")]).is_err());
        assert!(load(&[(WAKE_IF_ASLEEP_VAR, "maybe")]).is_err());
    }
}
