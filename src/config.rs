//! Configuration loading.
//!
//! Settings come from built-in defaults, then an optional JSON file in the
//! config directory, then `CRACKWATCH_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_ENDPOINT, DEFAULT_RECEIVE_TIMEOUT};

/// Name of the configuration file inside [`Config::config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Client configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// SockJS websocket endpoint. `http(s)://` is rewritten to `ws(s)://`.
    pub endpoint: String,
    /// Seconds allowed for the websocket upgrade.
    pub connect_timeout_secs: u64,
    /// Seconds allowed between sending the query and receiving its result.
    pub receive_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            receive_timeout_secs: DEFAULT_RECEIVE_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Returns the configuration directory path.
    ///
    /// `CRACKWATCH_CONFIG_DIR` wins; otherwise the platform config dir
    /// (e.g. `~/.config/crackwatch`).
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("CRACKWATCH_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("crackwatch"))
    }

    /// Loads configuration from file, with environment variable overrides.
    ///
    /// A missing or unreadable file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        let path = Self::config_dir()?.join(CONFIG_FILE_NAME);
        let mut config = Self::load_from_file(&path).unwrap_or_else(|e| {
            log::debug!("[Config] Using defaults: {:#}", e);
            Self::default()
        });
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a configuration file. Fields absent from the file keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.endpoint = http_to_ws_scheme(&config.endpoint);
        Ok(config)
    }

    /// Apply `CRACKWATCH_*` overrides using `lookup` to read variables.
    ///
    /// Unparseable numbers are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("CRACKWATCH_ENDPOINT") {
            self.endpoint = http_to_ws_scheme(&endpoint);
        }

        if let Some(secs) = lookup("CRACKWATCH_CONNECT_TIMEOUT") {
            match secs.parse() {
                Ok(secs) => self.connect_timeout_secs = secs,
                Err(e) => log::warn!("[Config] Ignoring CRACKWATCH_CONNECT_TIMEOUT={}: {}", secs, e),
            }
        }

        if let Some(secs) = lookup("CRACKWATCH_RECEIVE_TIMEOUT") {
            match secs.parse() {
                Ok(secs) => self.receive_timeout_secs = secs,
                Err(e) => log::warn!("[Config] Ignoring CRACKWATCH_RECEIVE_TIMEOUT={}: {}", secs, e),
            }
        }
    }

    /// Websocket upgrade deadline, at least one second.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// Result deadline, at least one second.
    #[must_use]
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_secs(self.receive_timeout_secs.max(1))
    }
}

/// Convert an HTTP(S) URL to WS(S) scheme.
///
/// Passes `ws://` and `wss://` through unchanged.
#[must_use]
pub fn http_to_ws_scheme(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.receive_timeout(), DEFAULT_RECEIVE_TIMEOUT);
    }

    #[test]
    fn test_zero_timeouts_are_clamped() {
        let config = Config {
            connect_timeout_secs: 0,
            receive_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert_eq!(config.receive_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CRACKWATCH_ENDPOINT", "https://mirror.example/sockjs/a/b/websocket"),
            ("CRACKWATCH_CONNECT_TIMEOUT", "3"),
            ("CRACKWATCH_RECEIVE_TIMEOUT", "45"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(ToString::to_string));
        assert_eq!(config.endpoint, "wss://mirror.example/sockjs/a/b/websocket");
        assert_eq!(config.connect_timeout_secs, 3);
        assert_eq!(config.receive_timeout_secs, 45);
    }

    #[test]
    fn test_bad_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "CRACKWATCH_RECEIVE_TIMEOUT").then(|| "soon".to_string()));
        assert_eq!(config.receive_timeout(), DEFAULT_RECEIVE_TIMEOUT);
    }

    #[test]
    fn test_http_to_ws_scheme() {
        assert_eq!(http_to_ws_scheme("https://example.com/ws"), "wss://example.com/ws");
        assert_eq!(http_to_ws_scheme("http://localhost:3000"), "ws://localhost:3000");
        assert_eq!(http_to_ws_scheme("wss://example.com/ws"), "wss://example.com/ws");
        assert_eq!(http_to_ws_scheme("ws://localhost:3000"), "ws://localhost:3000");
    }
}
