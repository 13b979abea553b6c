use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::load_balancer::LoadBalancerConfig;
use super::logging::LoggingConfig;
use super::provider::ProviderConfig;

const LOCAL_CONFIG_PATH: &str = "fleetlb.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/fleetlb/config.toml";

/// Main configuration structure for fleetlb
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Cloud coordinates and remote call behaviour
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Inventory cache freshness windows
    #[serde(default)]
    pub cache: CacheConfig,

    /// Load balancer model the backend pools belong to
    #[serde(default)]
    pub load_balancer: LoadBalancerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. fleetlb.toml in current directory
    /// 3. /etc/fleetlb/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(group) = overrides.resource_group {
            self.provider.resource_group = group;
        }
        if let Some(name) = overrides.primary_scale_set_name {
            self.provider.primary_scale_set_name = name;
        }
        if let Some(secs) = overrides.remote_call_timeout_secs {
            self.provider.remote_call_timeout_secs = secs;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.resource_group.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider.resource_group must be set".to_string(),
            ));
        }

        if self.provider.remote_call_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.remote_call_timeout_secs cannot be 0".to_string(),
            ));
        }

        if self.cache.fleet_ttl_secs == 0 || self.cache.instance_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache TTLs cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|path| std::path::Path::new(path).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub resource_group: Option<String>,
    pub primary_scale_set_name: Option<String>,
    pub remote_call_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}
