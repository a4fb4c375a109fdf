//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables (a `.env` file is loaded first), then CLI flags.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// SQLite database path. In-memory storage when unset.
    pub database_url: Option<String>,
    /// Seconds between reaper sweeps.
    pub reap_interval_secs: u64,
    /// Matches without activity for this long are dropped from memory.
    pub max_idle_secs: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: None,
            reap_interval_secs: 60,
            max_idle_secs: 6 * 60 * 60,
        }
    }
}

impl ServerConfig {
    /// Loads defaults, overlays the TOML file at `path` if given, then
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or an environment
    /// variable holds an unparsable number.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.max_idle()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Parses a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Overlays `KV_HOST`, `KV_PORT`, `DATABASE_URL`, `KV_REAP_INTERVAL_SECS`
    /// and `KV_MAX_IDLE_SECS` read through `var`.
    ///
    /// # Errors
    ///
    /// Fails if a numeric variable does not parse.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = var("KV_HOST") {
            self.host = host;
        }
        if let Some(port) = var("KV_PORT") {
            self.port = port.parse().context("KV_PORT must be a port number")?;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(secs) = var("KV_REAP_INTERVAL_SECS") {
            self.reap_interval_secs = secs
                .parse()
                .context("KV_REAP_INTERVAL_SECS must be a number of seconds")?;
        }
        if let Some(secs) = var("KV_MAX_IDLE_SECS") {
            self.max_idle_secs = secs
                .parse()
                .context("KV_MAX_IDLE_SECS must be a number of seconds")?;
            self.max_idle()?;
        }
        Ok(())
    }

    /// Idle window after which a match is evicted from memory.
    ///
    /// # Errors
    ///
    /// Fails unless `max_idle_secs` is positive and representable as a
    /// [`chrono::Duration`].
    pub fn max_idle(&self) -> Result<chrono::Duration> {
        if self.max_idle_secs <= 0 {
            bail!("max_idle_secs must be positive, got {}", self.max_idle_secs);
        }
        chrono::Duration::try_seconds(self.max_idle_secs)
            .with_context(|| format!("max_idle_secs {} is out of range", self.max_idle_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("KV_PORT", "9000"), ("DATABASE_URL", "kv.db")]);
        let mut config = ServerConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url.as_deref(), Some("kv.db"));
    }

    #[test]
    fn test_idle_window_out_of_range_rejected() {
        let mut config = ServerConfig::default();
        let huge = i64::MAX.to_string();
        assert!(config.apply_env(|key| (key == "KV_MAX_IDLE_SECS").then(|| huge.clone())).is_err());

        let config: ServerConfig = toml::from_str("max_idle_secs = -5").unwrap();
        assert!(config.max_idle().is_err());
        assert_eq!(
            ServerConfig::default().max_idle().unwrap(),
            chrono::Duration::hours(6)
        );
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut config = ServerConfig::default();
        assert!(config.apply_env(|key| (key == "KV_PORT").then(|| "http".to_string())).is_err());
    }
}
