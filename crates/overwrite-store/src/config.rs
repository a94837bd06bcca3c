//! Configuration for the overwrite cache

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Overwrite cache configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverwriteCacheConfig {
    /// Seconds an entry stays fresh after its last write
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Seconds between background sweeps of expired entries (0 = no sweeper)
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    /// Maximum number of cached entries across all scopes (0 = unlimited)
    #[serde(default)]
    pub max_entries: usize,
}

fn default_ttl_seconds() -> u64 {
    2 * 60 * 60
}

fn default_sweep_interval_seconds() -> u64 {
    10 * 60
}

impl Default for OverwriteCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
            max_entries: 0,
        }
    }
}

impl OverwriteCacheConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;

        // Support both YAML and TOML based on extension
        let config: OverwriteCacheConfig = if path
            .as_ref()
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            serde_yaml::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ttl_seconds == 0 {
            return Err(anyhow::anyhow!("ttl_seconds must be greater than zero"));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds.max(1))
    }

    /// `None` when background sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_seconds > 0).then(|| Duration::from_secs(self.sweep_interval_seconds))
    }
}
