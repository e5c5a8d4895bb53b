//! Orchestrator configuration
//!
//! Tunables for one recording run: output location, encoder binary, polling
//! cadence, resource thresholds and the shutdown grace period. Persisted as
//! JSON so hosts can keep user settings next to their other state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::RecorderResult;

const GIB: u64 = 1024 * 1024 * 1024;

/// Configuration for the recording coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Base directory for session directories; `~/Videos` when unset
    pub base_dir: Option<PathBuf>,

    /// Encoder binary to spawn
    pub ffmpeg_program: String,

    /// Liveness poll interval in milliseconds
    pub health_poll_ms: u64,

    /// Disk/memory poll interval in milliseconds
    pub resource_poll_ms: u64,

    /// Warn when free disk space at the session path drops below this
    pub disk_threshold_bytes: u64,

    /// Warn when available system memory drops below this
    pub memory_threshold_bytes: u64,

    /// How long to wait after the graceful-quit byte before killing
    pub shutdown_grace_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            ffmpeg_program: "ffmpeg".to_string(),
            health_poll_ms: 2_000,
            resource_poll_ms: 30_000,
            disk_threshold_bytes: GIB,
            memory_threshold_bytes: GIB / 2,
            shutdown_grace_ms: 3_000,
        }
    }
}

impl RecorderConfig {
    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_millis(self.health_poll_ms)
    }

    pub fn resource_poll_interval(&self) -> Duration {
        Duration::from_millis(self.resource_poll_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> RecorderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> RecorderResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
