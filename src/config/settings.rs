//! Application settings and configuration types.
//!
//! Settings are persisted to `~/.config/mailmind/settings.json` (or XDG
//! equivalent) and loaded at application startup. A missing file yields
//! the defaults; an unreadable one is an error the caller decides on.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ModelBackend;

/// File name of the settings file inside the config directory.
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no home directory available to locate the config file")]
    NoConfigDir,
}

/// Result type for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend API configuration.
    pub backend: BackendSettings,
    /// Session persistence and restoration configuration.
    pub session: SessionSettings,
    /// Assistant defaults.
    pub assistant: AssistantSettings,
}

impl Settings {
    /// Returns the platform path of the settings file.
    pub fn default_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "mailmind", "mailmind")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    /// Loads settings from the given path.
    ///
    /// A missing file is not an error; it yields the defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads settings from the platform config directory.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Writes settings to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Origin of the assistant backend.
    pub base_url: String,
    /// Timeout applied to every backend request.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Session persistence and restoration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Keychain service name the canonical token is stored under.
    pub keychain_service: String,
    /// Bound on the wait for a token write to become readable.
    #[serde(with = "duration_millis")]
    pub confirm_timeout: Duration,
    /// Interval between confirmation read-backs.
    #[serde(with = "duration_millis")]
    pub confirm_poll_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            keychain_service: "io.mailmind.app".to_string(),
            confirm_timeout: Duration::from_millis(500),
            confirm_poll_interval: Duration::from_millis(25),
        }
    }
}

/// Assistant defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Model backend selected when the user has not picked one.
    pub default_model: ModelBackend,
    /// Number of messages shown in the inbox list.
    pub email_limit: u32,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            default_model: ModelBackend::OpenAi,
            email_limit: 20,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
