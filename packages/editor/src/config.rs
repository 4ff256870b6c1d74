use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tagmend_history::BucketClock;

pub const DEFAULT_CONFIG_NAME: &str = "tagmend.config.json";

/// Tagmend configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Directory containing the editable HTML pages
    #[serde(default = "default_site_root")]
    pub site_root: String,

    /// Directory version history is written under
    #[serde(default = "default_backup_root")]
    pub backup_root: String,

    /// Clock used to name daily history buckets
    #[serde(default)]
    pub bucket_clock: BucketClock,
}

fn default_site_root() -> String {
    "site".to_string()
}

fn default_backup_root() -> String {
    "backups".to_string()
}

impl ServiceConfig {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: ServiceConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(ServiceConfig::default())
        }
    }

    /// Get absolute path to the site root
    pub fn site_root_in(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.site_root)
    }

    /// Get absolute path to the backup root
    pub fn backup_root_in(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.backup_root)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            site_root: default_site_root(),
            backup_root: default_backup_root(),
            bucket_clock: BucketClock::default(),
        }
    }
}
