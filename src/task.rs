//! Capture task model
//!
//! A capture task describes one user-selected source to record. Each task
//! maps to exactly one encoder subprocess; the task label is the join key
//! between records, status events and output files.

use serde::{Deserialize, Serialize};

/// How a screen task frames its capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenMode {
    /// Capture the whole monitor at its reported position/resolution
    Fullscreen,
    /// Capture an externally selected rectangle
    Area,
}

/// A selected capture rectangle in virtual-desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl AreaGeometry {
    /// Truncate odd width/height to the next lower even value.
    ///
    /// yuv420p encoding requires even dimensions, so geometry is aligned
    /// before it ever reaches the platform resolver.
    pub fn even_aligned(self) -> Self {
        Self {
            width: self.width - (self.width % 2),
            height: self.height - (self.height % 2),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One user-selected source to record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CaptureTask {
    #[serde(rename_all = "camelCase")]
    Screen {
        monitor_id: u32,
        mode: ScreenMode,
        /// Monitor top-left in virtual-desktop coordinates
        position: (i32, i32),
        /// Monitor resolution in pixels
        resolution: (u32, u32),
        /// Selected rectangle, required in Area mode
        area: Option<AreaGeometry>,
    },
    #[serde(rename_all = "camelCase")]
    Webcam { device_id: u32, device_name: String },
    #[serde(rename_all = "camelCase")]
    Audio {
        device_id: String,
        device_name: String,
        is_input: bool,
        is_loopback: bool,
    },
}

impl CaptureTask {
    /// Task kind name, used in errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CaptureTask::Screen { .. } => "screen",
            CaptureTask::Webcam { .. } => "webcam",
            CaptureTask::Audio { .. } => "audio",
        }
    }

    /// Deterministic label, unique within a session as long as the host
    /// does not select the same device twice: `"Screen 0"`,
    /// `"Webcam Logitech C920"`, `"Audio Built-in Microphone"`.
    pub fn label(&self) -> String {
        match self {
            CaptureTask::Screen { monitor_id, .. } => format!("Screen {monitor_id}"),
            CaptureTask::Webcam { device_name, .. } => {
                format!("Webcam {}", strip_annotation(device_name))
            }
            CaptureTask::Audio { device_name, .. } => {
                format!("Audio {}", strip_annotation(device_name))
            }
        }
    }

    /// Whether the task produces video (mp4) rather than audio (mp3).
    pub fn is_video(&self) -> bool {
        !matches!(self, CaptureTask::Audio { .. })
    }

    /// Output file extension for this task kind.
    pub fn extension(&self) -> &'static str {
        if self.is_video() {
            "mp4"
        } else {
            "mp3"
        }
    }
}

/// Strip leading bracketed annotations such as `"[Input] "` from a device
/// name. Catalog names carry these for UI grouping; they have no place in
/// labels, file names or dshow device strings.
pub fn strip_annotation(name: &str) -> &str {
    let mut rest = name.trim_start();
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => rest = stripped[end + 1..].trim_start(),
            None => break,
        }
    }
    rest
}

/// Make a string safe to use as a file name.
///
/// Strips leading bracketed annotations, replaces every character in
/// `\ / * ? : " < > |` with `_`, then trims surrounding whitespace.
/// Total: never fails, any input produces a usable stem.
pub fn sanitize_filename(name: &str) -> String {
    strip_annotation(name)
        .chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_input_annotation() {
        assert_eq!(sanitize_filename("[Input] Mic (USB)"), "Mic (USB)");
        assert_eq!(sanitize_filename("[Output] Speakers"), "Speakers");
    }

    #[test]
    fn strips_stacked_annotations() {
        assert_eq!(sanitize_filename("[Input] [Loopback] Monitor"), "Monitor");
    }

    #[test]
    fn replaces_forbidden_characters() {
        let out = sanitize_filename(r#"a\b/c*d?e:f"g<h>i|j"#);
        assert_eq!(out, "a_b_c_d_e_f_g_h_i_j");
        for c in ['\\', '/', '*', '?', ':', '"', '<', '>', '|'] {
            assert!(!out.contains(c));
        }
    }

    #[test]
    fn total_on_degenerate_input() {
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("   "), "");
        assert_eq!(sanitize_filename("[unterminated"), "[unterminated");
    }

    #[test]
    fn even_alignment_truncates_down() {
        let geo = AreaGeometry {
            x: 3,
            y: 7,
            width: 101,
            height: 51,
        };
        let aligned = geo.even_aligned();
        assert_eq!((aligned.width, aligned.height), (100, 50));
        assert_eq!((aligned.x, aligned.y), (3, 7));

        let even = AreaGeometry {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        };
        assert_eq!(even.even_aligned(), even);
    }

    #[test]
    fn labels_are_deterministic() {
        let screen = CaptureTask::Screen {
            monitor_id: 0,
            mode: ScreenMode::Fullscreen,
            position: (0, 0),
            resolution: (1920, 1080),
            area: None,
        };
        assert_eq!(screen.label(), "Screen 0");

        let audio = CaptureTask::Audio {
            device_id: "alsa_input.usb".into(),
            device_name: "[Input] Built-in Microphone".into(),
            is_input: true,
            is_loopback: false,
        };
        assert_eq!(audio.label(), "Audio Built-in Microphone");
        assert_eq!(audio.extension(), "mp3");
        assert_eq!(screen.extension(), "mp4");
    }
}
