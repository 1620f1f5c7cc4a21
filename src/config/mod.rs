mod config;

pub use config::{ReplaySettings, Settings, SnapshotSettings};
