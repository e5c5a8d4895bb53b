//! Device descriptors
//!
//! Shapes produced by the external device catalog. Enumeration itself is a
//! collaborator concern; the orchestrator only consumes these descriptors
//! when the host turns them into capture tasks.

use serde::{Deserialize, Serialize};

/// Information about a monitor/display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    /// Stable index assigned by the catalog
    pub id: u32,

    /// Display name
    pub name: String,

    /// Resolution in pixels
    pub resolution: (u32, u32),

    /// Top-left position in virtual-desktop coordinates
    pub position: (i32, i32),

    /// Whether this is the primary display
    pub is_primary: bool,
}

/// Information about an audio device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDevice {
    /// Identifier understood by the platform sound server
    pub id: String,

    /// Device name, possibly annotated like `"[Input] Mic"`
    pub name: String,

    /// True for microphones, false for playback devices
    pub is_input: bool,

    /// True for loopback capture of a playback device
    pub is_loopback: bool,

    /// Whether this is the default device of its direction
    pub is_default: bool,
}

/// Information about a webcam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webcam {
    /// Stable index assigned by the catalog
    pub id: u32,

    /// Device name
    pub name: String,
}
