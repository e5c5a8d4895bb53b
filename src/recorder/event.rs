//! Recorder events
//!
//! Everything the orchestrator tells the outside world flows through these
//! immutable events on a broadcast channel; consumers subscribe instead of
//! sharing mutable state with the supervision loops.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle status of one encoder subprocess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// Launched, not yet observed by the health monitor
    Pending,
    /// Alive at the last poll
    Running,
    /// Exited on its own with code 0
    ExitedOk,
    /// Exited on its own with a non-zero code
    ExitedError,
    /// Terminated by the shutdown sequence
    Stopped,
}

impl ProcessStatus {
    /// Terminal statuses never revert.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessStatus::ExitedOk | ProcessStatus::ExitedError | ProcessStatus::Stopped
        )
    }
}

/// Which standard stream a log line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Resource kinds watched by the resource guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Disk,
    Memory,
}

/// Events emitted during a recording session
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    /// Recording started; all launchable processes are up
    Started { directory: PathBuf },

    /// Recording stopped and the session was drained
    Stopped,

    /// Health monitor or shutdown observed a process status
    Status {
        label: String,
        pid: u32,
        status: ProcessStatus,
    },

    /// One-shot low-resource warning
    ResourceWarning { kind: ResourceKind, message: String },

    /// A line from an encoder's stdout/stderr
    Log {
        label: String,
        stream: StreamKind,
        line: String,
    },
}
