use crate::paths;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_balloon_timeout_ms() -> u64 {
    10_000
}

/// Tray agent settings, read from `<config_dir>/apctray/config.json`.
///
/// A missing file yields the defaults; a malformed file is reported and
/// replaced by the defaults so the agent still comes up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrayConfig {
    /// Icon refresh cadence in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Fallback auto-clear timeout for balloons whose display duration
    /// the shell did not report.
    #[serde(default = "default_balloon_timeout_ms")]
    pub balloon_timeout_ms: u64,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            balloon_timeout_ms: default_balloon_timeout_ms(),
        }
    }
}

impl TrayConfig {
    pub fn load() -> Self {
        match paths::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                log::warn!("Config path unavailable: {}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from))
        {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn balloon_timeout(&self) -> Duration {
        Duration::from_millis(self.balloon_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_cadence() {
        let config = TrayConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.balloon_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrayConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, TrayConfig::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(TrayConfig::load_from(&path), TrayConfig::default());
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = TrayConfig {
            poll_interval_ms: 250,
            balloon_timeout_ms: 5000,
        };

        config.save_to(&path).unwrap();
        assert_eq!(TrayConfig::load_from(&path), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"poll_interval_ms": 2000}"#).unwrap();

        let config = TrayConfig::load_from(&path);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.balloon_timeout_ms, 10_000);
    }
}
