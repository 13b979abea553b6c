use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Freshness window of the fleet inventory.
    #[serde(default = "default_fleet_ttl_secs")]
    pub fleet_ttl_secs: u64,

    /// Freshness window of each per-fleet instance inventory.
    #[serde(default = "default_instance_ttl_secs")]
    pub instance_ttl_secs: u64,
}

impl CacheConfig {
    pub fn fleet_ttl(&self) -> Duration {
        Duration::from_secs(self.fleet_ttl_secs)
    }

    pub fn instance_ttl(&self) -> Duration {
        Duration::from_secs(self.instance_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fleet_ttl_secs: default_fleet_ttl_secs(),
            instance_ttl_secs: default_instance_ttl_secs(),
        }
    }
}

fn default_fleet_ttl_secs() -> u64 {
    600
}

fn default_instance_ttl_secs() -> u64 {
    600
}
