//! flyer-scout configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Config file (`flyer-scout.toml` unless `--config` is given)
//! 3. CLI flags
//!
//! ```toml
//! [cache]
//! dir = "cache"
//! default_ttl_secs = 3600
//!
//! [venue]
//! request_interval_ms = 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_cache::CacheConfig;
use serde::{Deserialize, Serialize};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "flyer-scout.toml";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoutConfig {
    pub cache: CacheConfig,
    pub venue: VenueConfig,
}

/// Venue enrichment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    /// Pause between consecutive events during enrichment
    pub request_interval_ms: u64,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: 100,
        }
    }
}

impl VenueConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

/// Errors loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ScoutConfig {
    /// Load from an explicit path. The file must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from `path` if given, else from the default path when present,
    /// else built-in defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ScoutConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI flag overrides.
    pub fn with_overrides(
        mut self,
        cache_dir: Option<PathBuf>,
        default_ttl_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = cache_dir {
            self.cache.cache_dir = dir;
        }
        if let Some(ttl) = default_ttl_secs {
            self.cache.default_ttl_secs = ttl;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.default_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.default_ttl_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cache.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cache.dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
