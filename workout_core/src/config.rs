//! Configuration file support for stepwork.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/stepwork/config.toml`.

use crate::calories::DEFAULT_FAT_BURNER_MULTIPLIER;
use crate::timer::DEFAULT_WARNING_THRESHOLDS;
use crate::{CaloriePolicy, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub fat_burner: FatBurnerConfig,
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

/// Session runner configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,

    #[serde(default = "default_transition_seconds")]
    pub transition_seconds: u32,

    #[serde(default)]
    pub calorie_policy: CaloriePolicy,

    #[serde(default = "default_warning_thresholds")]
    pub warning_thresholds: Vec<u32>,

    #[serde(default = "default_timed_seconds")]
    pub default_timed_seconds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rest_seconds: default_rest_seconds(),
            transition_seconds: default_transition_seconds(),
            calorie_policy: CaloriePolicy::default(),
            warning_thresholds: default_warning_thresholds(),
            default_timed_seconds: default_timed_seconds(),
        }
    }
}

/// Fat-burner mode parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FatBurnerConfig {
    #[serde(default = "default_calorie_multiplier")]
    pub calorie_multiplier: f64,
}

impl Default for FatBurnerConfig {
    fn default() -> Self {
        Self {
            calorie_multiplier: default_calorie_multiplier(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("stepwork")
}

fn default_rest_seconds() -> u32 {
    30
}

fn default_transition_seconds() -> u32 {
    30
}

fn default_warning_thresholds() -> Vec<u32> {
    DEFAULT_WARNING_THRESHOLDS.to_vec()
}

fn default_timed_seconds() -> u32 {
    60
}

fn default_calorie_multiplier() -> f64 {
    DEFAULT_FAT_BURNER_MULTIPLIER
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the session runner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.session.rest_seconds == 0 || self.session.transition_seconds == 0 {
            return Err(Error::Config("pause durations must be at least 1 second".into()));
        }
        if self.session.default_timed_seconds == 0 {
            return Err(Error::Config("default_timed_seconds must be at least 1".into()));
        }
        if !self.fat_burner.calorie_multiplier.is_finite()
            || self.fat_burner.calorie_multiplier < 1.0
        {
            return Err(Error::Config(format!(
                "fat_burner.calorie_multiplier must be >= 1.0, got {}",
                self.fat_burner.calorie_multiplier
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("stepwork").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.rest_seconds, 30);
        assert_eq!(config.session.calorie_policy, CaloriePolicy::Average);
        assert_eq!(config.session.warning_thresholds, vec![5, 3, 2, 1]);
        assert_eq!(config.fat_burner.calorie_multiplier, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.session.calorie_policy = CaloriePolicy::Max;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.session.calorie_policy, CaloriePolicy::Max);
        assert_eq!(parsed.session.rest_seconds, config.session.rest_seconds);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[session]
rest_seconds = 45
calorie_policy = "max"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.rest_seconds, 45);
        assert_eq!(config.session.calorie_policy, CaloriePolicy::Max);
        assert_eq!(config.session.transition_seconds, 30); // default
        assert_eq!(config.fat_burner.calorie_multiplier, 1.5); // default
    }

    #[test]
    fn test_pauses_configured_independently() {
        let config: Config = toml::from_str("[session]
transition_seconds = 90
").unwrap();
        assert_eq!(config.session.transition_seconds, 90);
        assert_eq!(config.session.rest_seconds, 30);

        let config: Config = toml::from_str("[session]
rest_seconds = 15
").unwrap();
        assert_eq!(config.session.rest_seconds, 15);
        assert_eq!(config.session.transition_seconds, 30);
        assert_eq!(
            config.session.transition_seconds,
            Config::default().session.transition_seconds
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nrest_seconds = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        let mut config = Config::default();
        config.fat_burner.calorie_multiplier = 0.5;
        assert!(config.validate().is_err());
    }
}
