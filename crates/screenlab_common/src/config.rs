//! Study configuration.
//!
//! Config file: ~/.config/screenlab/config.toml or /etc/screenlab/config.toml.
//! Every field has a protocol default, so running without a config file is
//! the normal case.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::ItemCatalog;
use crate::error::StudyError;

/// Inclusive range of safe items per bag, before threat insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagSize {
    pub min: usize,
    pub max: usize,
}

impl Default for BagSize {
    fn default() -> Self {
        Self { min: 4, max: 8 }
    }
}

/// Parameters of one interactive session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Trials per mode block
    #[serde(default = "default_rounds_per_block")]
    pub rounds_per_block: u32,

    /// Probability a generated bag contains a threat
    #[serde(default = "default_threat_probability")]
    pub threat_probability: f64,

    /// Probability the assistant's advisory matches ground truth
    #[serde(default = "default_assistant_reliability")]
    pub assistant_reliability: f64,

    /// Safe items per bag
    #[serde(default)]
    pub bag_size: BagSize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rounds_per_block: default_rounds_per_block(),
            threat_probability: default_threat_probability(),
            assistant_reliability: default_assistant_reliability(),
            bag_size: BagSize::default(),
        }
    }
}

/// Parameters of the batch verification harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Synthetic trials per verification run
    #[serde(default = "default_verification_trials")]
    pub trials: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            trials: default_verification_trials(),
        }
    }
}

/// Main study configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub verification: VerificationConfig,

    #[serde(default)]
    pub catalog: ItemCatalog,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            verification: VerificationConfig::default(),
            catalog: ItemCatalog::default(),
        }
    }
}

impl StudyConfig {
    /// Get default user config path: ~/.config/screenlab/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("XDG_CONFIG_HOME"))
            .context("Cannot determine home directory")?;

        let config_dir = if home.contains("/.config") {
            PathBuf::from(home)
        } else {
            Path::new(&home).join(".config")
        };

        Ok(config_dir.join("screenlab").join("config.toml"))
    }

    /// Get system config path: /etc/screenlab/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/screenlab/config.toml")
    }

    /// Load configuration from file
    ///
    /// Priority:
    /// 1. User config (~/.config/screenlab/config.toml)
    /// 2. System config (/etc/screenlab/config.toml)
    /// 3. Defaults
    ///
    /// The loaded config is validated; an invalid file is an error, not a
    /// silent fallback to defaults.
    pub fn load() -> Result<Self> {
        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: StudyConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Check all parameters are inside their contract ranges.
    pub fn validate(&self) -> Result<(), StudyError> {
        if self.session.rounds_per_block == 0 {
            return Err(StudyError::Configuration(
                "rounds_per_block must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.session.threat_probability) {
            return Err(StudyError::Configuration(format!(
                "threat_probability {} outside [0,1]",
                self.session.threat_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.session.assistant_reliability) {
            return Err(StudyError::Configuration(format!(
                "assistant_reliability {} outside [0,1]",
                self.session.assistant_reliability
            )));
        }
        if self.session.bag_size.min < 1 || self.session.bag_size.min > self.session.bag_size.max {
            return Err(StudyError::Configuration(format!(
                "bag_size [{},{}] is not a valid range",
                self.session.bag_size.min, self.session.bag_size.max
            )));
        }
        if self.verification.trials == 0 {
            return Err(StudyError::Configuration(
                "verification.trials must be at least 1".to_string(),
            ));
        }
        self.catalog.validate(self.session.bag_size.max)
    }
}

fn default_rounds_per_block() -> u32 {
    10
}

fn default_threat_probability() -> f64 {
    0.40
}

fn default_assistant_reliability() -> f64 {
    0.85
}

fn default_verification_trials() -> usize {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol() {
        let config = StudyConfig::default();
        assert_eq!(config.session.rounds_per_block, 10);
        assert_eq!(config.session.threat_probability, 0.40);
        assert_eq!(config.session.assistant_reliability, 0.85);
        assert_eq!(config.session.bag_size, BagSize { min: 4, max: 8 });
        assert_eq!(config.verification.trials, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: StudyConfig = toml::from_str("").unwrap();
        assert_eq!(config.session.rounds_per_block, 10);
        assert_eq!(config.catalog.safe.len(), 11);
    }

    #[test]
    fn test_partial_toml_overrides_one_field() {
        let config: StudyConfig = toml::from_str(
            "[session]\nthreat_probability = 0.25\n",
        )
        .unwrap();
        assert_eq!(config.session.threat_probability, 0.25);
        assert_eq!(config.session.assistant_reliability, 0.85);
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let mut config = StudyConfig::default();
        config.session.threat_probability = 1.5;
        assert!(config.validate().is_err());

        config.session.threat_probability = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_bag_size() {
        let mut config = StudyConfig::default();
        config.session.bag_size = BagSize { min: 9, max: 4 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bag_larger_than_catalog() {
        let mut config = StudyConfig::default();
        config.session.bag_size = BagSize { min: 4, max: 12 };
        assert!(config.validate().is_err());
    }
}
