//! Runtime settings loaded from `~/.config/medium-embed/config.toml`.
//!
//! ```toml
//! endpoint = "https://api.rss2json.com/v1/api.json"
//! timeout_secs = 30
//!
//! [mount]
//! height_buffer_px = 20
//! recheck_delay_ms = 500
//! placeholder = "Loading Medium posts..."
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::feed::DEFAULT_ENDPOINT;
use crate::mount::{MountOptions, DEFAULT_HEIGHT_BUFFER_PX, DEFAULT_PLACEHOLDER, DEFAULT_RECHECK_DELAY};

/// Settings shared by every embed instance in a process.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Feed-to-JSON conversion endpoint.
    pub endpoint: String,
    /// Whole-request timeout for the feed call.
    pub timeout_secs: u64,
    pub mount: MountSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MountSettings {
    /// Added to the observed content height.
    pub height_buffer_px: u32,
    /// Delay before the final height re-check.
    pub recheck_delay_ms: u64,
    pub placeholder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            mount: MountSettings::default(),
        }
    }
}

impl Default for MountSettings {
    fn default() -> Self {
        Self {
            height_buffer_px: DEFAULT_HEIGHT_BUFFER_PX,
            recheck_delay_ms: u64::try_from(DEFAULT_RECHECK_DELAY.as_millis()).unwrap_or(500),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default path.
    ///
    /// Returns defaults if the file doesn't exist (settings are optional).
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            height_buffer_px: self.mount.height_buffer_px,
            recheck_delay: Duration::from_millis(self.mount.recheck_delay_ms),
            placeholder: self.mount.placeholder.clone(),
        }
    }
}

/// Return the path to the settings file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("medium-embed")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_settings() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.endpoint, "https://api.rss2json.com/v1/api.json");
        assert_eq!(settings.mount.height_buffer_px, 20);
        assert_eq!(settings.mount.recheck_delay_ms, 500);
    }

    #[test]
    fn parse_partial_mount_section() {
        let settings: Settings = toml::from_str(
            r#"
timeout_secs = 5

[mount]
recheck_delay_ms = 1200
"#,
        )
        .unwrap();

        assert_eq!(settings.timeout(), Duration::from_secs(5));
        let options = settings.mount_options();
        assert_eq!(options.recheck_delay, Duration::from_millis(1200));
        assert_eq!(options.height_buffer_px, 20);
        assert_eq!(options.placeholder, DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn load_from_reports_invalid_toml() {
        let dir = std::env::temp_dir().join(format!("medium-embed-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_from_reports_missing_file() {
        let err = Settings::load_from(Path::new("/nonexistent/medium-embed.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
