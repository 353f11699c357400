//! Configuration file support for breathe.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/breathe/config.toml`.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub cues: CueConfig,

    #[serde(default)]
    pub wake_lock: WakeLockConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Session timing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Rest between exercises; zero or negative disables it
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: i64,

    /// How long the "done" screen stays up
    #[serde(default = "default_completion_grace_ms")]
    pub completion_grace_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: default_cooldown_seconds(),
            completion_grace_ms: default_completion_grace_ms(),
        }
    }
}

impl SessionConfig {
    pub fn completion_grace(&self) -> Duration {
        Duration::from_millis(self.completion_grace_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CueConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WakeLockConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for WakeLockConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Catalog file inside a data directory
pub fn catalog_path(data_dir: &Path) -> PathBuf {
    data_dir.join("catalog.json")
}

/// History log inside a data directory
pub fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join("history.jsonl")
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("breathe")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_cooldown_seconds() -> i64 {
    10
}

fn default_completion_grace_ms() -> u64 {
    1500
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("breathe").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.cooldown_seconds, 10);
        assert_eq!(config.session.completion_grace(), Duration::from_millis(1500));
        assert!(config.cues.enabled);
        assert!(config.wake_lock.enabled);
        assert!(config.data.data_dir.ends_with("breathe"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[data]\ndata_dir = \"/srv/breathe\"\n[session]\ncooldown_seconds = 0\n[cues]\nenabled = false\n",
        )
        .unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.session.cooldown_seconds, 0);
        assert!(!parsed.cues.enabled);
        assert!(parsed.wake_lock.enabled);
        assert_eq!(parsed.data.data_dir, PathBuf::from("/srv/breathe"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[session]
cooldown_seconds = 15
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.cooldown_seconds, 15);
        assert_eq!(config.session.completion_grace_ms, 1500); // default
        assert!(config.wake_lock.enabled);
    }

    #[test]
    fn test_negative_cooldown_parses() {
        let config: Config = toml::from_str("[session]\ncooldown_seconds = -3\n").unwrap();
        assert_eq!(config.session.cooldown_seconds, -3);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[session]\ncooldown_seconds = \"ten\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }

    #[test]
    fn test_data_paths() {
        let dir = Path::new("/tmp/breathe");
        assert_eq!(catalog_path(dir), PathBuf::from("/tmp/breathe/catalog.json"));
        assert_eq!(history_path(dir), PathBuf::from("/tmp/breathe/history.jsonl"));
    }
}
