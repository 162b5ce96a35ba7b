use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    #[default]
    Stub,
    Echo,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot determine config directory")]
    NoConfigDir,

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime configuration, read from `<config_dir>/neo/config.json`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reply_delay_ms: u64,
    pub reply_mode: ReplyMode,
    /// Recognizer argv; dictation is unsupported when unset
    pub dictation_command: Option<Vec<String>>,
    pub dictation_language: String,
    pub notification_ttl_secs: u64,
    pub max_notifications: usize,
    pub user_name: String,
    pub user_email: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1500,
            reply_mode: ReplyMode::Stub,
            dictation_command: None,
            dictation_language: "en-US".to_string(),
            notification_ttl_secs: 4,
            max_notifications: 50,
            user_name: "Areeb".to_string(),
            user_email: "areeb@example.com".to_string(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("neo").join("config.json"))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn greeting(&self) -> String {
        format!("Hey, {}, how may I help you?", self.user_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.reply_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "reply_mode": "echo", "dictation_command": ["rec", "--once"] }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.reply_mode, ReplyMode::Echo);
        assert_eq!(
            config.dictation_command,
            Some(vec!["rec".to_string(), "--once".to_string()])
        );
        assert_eq!(config.dictation_language, "en-US");
        assert_eq!(config.notification_ttl(), Duration::from_secs(4));
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "reply_mode": "loud" }"#).unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_greeting_uses_name() {
        let config = AppConfig::default();
        assert_eq!(config.greeting(), "Hey, Areeb, how may I help you?");
    }
}
