use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::utils::SNAPSHOT_INTERVAL_SECS;

/// Event trace replay configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySettings {
    /// JSONL trace of MiningManager events, in chain order.
    pub trace_file: String,
    /// Optional path for a pretty-printed JSON dump of the final entities.
    #[serde(default)]
    pub dump_file: Option<String>,
}

/// Snapshot bucketing configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotSettings {
    #[serde(default = "default_snapshot_interval_secs")]
    pub interval_secs: u64,
}

fn default_snapshot_interval_secs() -> u64 {
    SNAPSHOT_INTERVAL_SECS
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_snapshot_interval_secs(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub replay: ReplaySettings,
    #[serde(default)]
    pub snapshots: SnapshotSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
