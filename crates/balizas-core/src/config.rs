//! Runtime configuration.
//!
//! Settings are read from `~/.config/balizas-v16/config.json` when that file
//! exists, then overridden by `BALIZAS_*` environment variables. Every field
//! is optional; missing values fall back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_FEED_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Application name used for the config directory path
const APP_NAME: &str = "balizas-v16";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Address the HTTP server binds to when nothing else is configured
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

const ENV_FEED_URL: &str = "BALIZAS_FEED_URL";
const ENV_LISTEN_ADDR: &str = "BALIZAS_LISTEN_ADDR";
const ENV_REQUEST_TIMEOUT_SECS: &str = "BALIZAS_REQUEST_TIMEOUT_SECS";
const ENV_REFRESH_INTERVAL_SECS: &str = "BALIZAS_REFRESH_INTERVAL_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub feed_url: Option<String>,
    pub listen_addr: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Optional background refresh; `None` keeps refresh purely on-demand.
    pub refresh_interval_secs: Option<u64>,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed_url = Some(url);
        }
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.listen_addr = Some(addr);
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = Some(parse_secs(ENV_REQUEST_TIMEOUT_SECS, &secs)?);
        }
        if let Some(secs) = lookup(ENV_REFRESH_INTERVAL_SECS) {
            let secs = parse_secs(ENV_REFRESH_INTERVAL_SECS, &secs)?;
            // 0 disables the background refresh
            self.refresh_interval_secs = (secs > 0).then_some(secs);
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn feed_url(&self) -> &str {
        self.feed_url.as_deref().unwrap_or(DEFAULT_FEED_URL)
    }

    pub fn listen_addr(&self) -> &str {
        self.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed_url(), DEFAULT_FEED_URL);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("BALIZAS_FEED_URL", "http://localhost:8080/feed"),
            ("BALIZAS_LISTEN_ADDR", "127.0.0.1:4000"),
            ("BALIZAS_REQUEST_TIMEOUT_SECS", "5"),
            ("BALIZAS_REFRESH_INTERVAL_SECS", "120"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.feed_url(), "http://localhost:8080/feed");
        assert_eq!(config.listen_addr(), "127.0.0.1:4000");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_zero_interval_disables_refresh() {
        let vars = env(&[("BALIZAS_REFRESH_INTERVAL_SECS", "0")]);
        let mut config = Config {
            refresh_interval_secs: Some(60),
            ..Config::default()
        };
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_invalid_number_is_error() {
        let vars = env(&[("BALIZAS_REQUEST_TIMEOUT_SECS", "soon")]);
        let mut config = Config::default();
        let err = config.apply_overrides(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("BALIZAS_REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn test_parse_config_file() {
        let json = r#"{"feed_url": "http://mirror/feed", "refresh_interval_secs": 300}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.feed_url(), "http://mirror/feed");
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(300)));
    }
}
