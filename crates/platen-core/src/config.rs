//! Configuration management for platen.
//!
//! Loads configuration from ${PLATEN_HOME}/config.toml with sensible
//! defaults when the file is absent.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default config template with comments, embedded at compile time.
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

pub mod paths {
    //! Path resolution for platen configuration and data.
    //!
    //! PLATEN_HOME resolution order:
    //! 1. PLATEN_HOME environment variable (if set)
    //! 2. ~/.config/platen (default)

    use std::path::PathBuf;

    /// Returns the platen home directory.
    pub fn platen_home() -> PathBuf {
        if let Ok(home) = std::env::var("PLATEN_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("platen"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        platen_home().join("config.toml")
    }

    /// Returns the path to the persisted conversation token.
    pub fn conversation_path() -> PathBuf {
        platen_home().join("conversation")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        platen_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote query endpoint URL.
    pub endpoint: String,

    /// Number of retrieval results the endpoint should consider.
    pub top_k: u32,

    /// Request timeout in seconds (0 disables).
    pub request_timeout_secs: u32,

    /// Typewriter speed in milliseconds per revealed character.
    /// 0 disables the animation.
    pub reveal_interval_ms: u64,

    /// Greeting shown as the first assistant message.
    pub greeting: String,
}

impl Config {
    const DEFAULT_ENDPOINT: &str = "https://innovate.aiims.com.au/api/query";
    const DEFAULT_TOP_K: u32 = 3;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_REVEAL_INTERVAL_MS: u64 = 18;
    const DEFAULT_GREETING: &str = "Hello! Ask me anything about our products.";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the effective endpoint URL.
    ///
    /// The PLATEN_ENDPOINT environment variable takes precedence over the
    /// config file (test rigs and proxies).
    pub fn effective_endpoint(&self) -> Result<Url> {
        let raw = std::env::var("PLATEN_ENDPOINT").unwrap_or_else(|_| self.endpoint.clone());
        Url::parse(&raw).with_context(|| format!("Invalid endpoint URL: {raw}"))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    /// Milliseconds per revealed character; zero means no animation.
    pub fn reveal_interval(&self) -> Option<Duration> {
        if self.reveal_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.reveal_interval_ms))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            top_k: Self::DEFAULT_TOP_K,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            reveal_interval_ms: Self::DEFAULT_REVEAL_INTERVAL_MS,
            greeting: Self::DEFAULT_GREETING.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.reveal_interval_ms, 18);
        assert!(!config.greeting.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "top_k = 7\nreveal_interval_ms = 0\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.top_k, 7);
        assert_eq!(config.reveal_interval(), None);
        assert_eq!(config.endpoint, Config::DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "top_k = [oops").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_timeout_zero_disables() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        // The commented template must stay in sync with the defaults.
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.endpoint, Config::DEFAULT_ENDPOINT);
    }
}
