//! Platform input resolution
//!
//! Maps an abstract capture task to the concrete FFmpeg input invocation
//! for the host operating system. One resolver per OS, selected once at
//! coordinator construction; no OS checks anywhere else in the crate.

pub mod linux;
pub mod macos;
pub mod windows;

use serde::{Deserialize, Serialize};

use crate::error::{RecorderError, RecorderResult};
use crate::task::{AreaGeometry, CaptureTask, ScreenMode};

/// Fixed capture frame rate for video sources
pub const VIDEO_FRAMERATE: u32 = 30;

/// Supported host operating systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Linux,
    MacOs,
}

impl Os {
    /// Detect the host OS, failing for platforms with no capture mapping.
    pub fn detect() -> RecorderResult<Self> {
        match std::env::consts::OS {
            "windows" => Ok(Os::Windows),
            "linux" => Ok(Os::Linux),
            "macos" => Ok(Os::MacOs),
            _ => Err(RecorderError::UnsupportedPlatform {
                os: std::env::consts::OS,
                task_kind: "any",
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
            Os::MacOs => "macos",
        }
    }
}

/// Concrete FFmpeg input specification for one capture task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    /// Demuxer passed as `-f`
    pub demuxer: &'static str,

    /// Source string passed as `-i`
    pub source: String,

    /// Captured size passed as `-video_size`
    pub video_size: Option<(u32, u32)>,

    /// Frame rate passed as `-framerate`
    pub framerate: Option<u32>,

    /// Pixel offset into the desktop, passed as `-offset_x`/`-offset_y`
    pub offset: Option<(i32, i32)>,

    /// Raw pixel format passed as `-pixel_format`
    pub pixel_format: Option<&'static str>,

    /// Channel count passed as `-ac`
    pub channels: Option<u8>,

    /// Whether to render the cursor into the capture
    pub draw_mouse: bool,
}

impl InputSpec {
    fn video(demuxer: &'static str, source: String) -> Self {
        Self {
            demuxer,
            source,
            video_size: None,
            framerate: Some(VIDEO_FRAMERATE),
            offset: None,
            pixel_format: None,
            channels: None,
            draw_mouse: false,
        }
    }

    fn audio(demuxer: &'static str, source: String) -> Self {
        Self {
            demuxer,
            source,
            video_size: None,
            framerate: None,
            offset: None,
            pixel_format: None,
            channels: Some(2),
            draw_mouse: false,
        }
    }

    /// Input half of the FFmpeg argument vector, `-f ... -i <source>`.
    /// Options must precede `-i` to apply to this input.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.demuxer.to_string()];
        if let Some(rate) = self.framerate {
            args.push("-framerate".to_string());
            args.push(rate.to_string());
        }
        if let Some((x, y)) = self.offset {
            args.push("-offset_x".to_string());
            args.push(x.to_string());
            args.push("-offset_y".to_string());
            args.push(y.to_string());
        }
        if let Some((w, h)) = self.video_size {
            args.push("-video_size".to_string());
            args.push(format!("{w}x{h}"));
        }
        if self.draw_mouse {
            args.push("-draw_mouse".to_string());
            args.push("1".to_string());
        }
        if let Some(format) = self.pixel_format {
            args.push("-pixel_format".to_string());
            args.push(format.to_string());
        }
        if let Some(channels) = self.channels {
            args.push("-ac".to_string());
            args.push(channels.to_string());
        }
        args.push("-i".to_string());
        args.push(self.source.clone());
        args
    }
}

/// Resolved screen capture rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Compute the capture rectangle for a screen task, enforcing the
/// even-dimension encoder constraint.
fn screen_geometry(
    mode: ScreenMode,
    position: (i32, i32),
    resolution: (u32, u32),
    area: Option<AreaGeometry>,
) -> RecorderResult<ScreenGeometry> {
    let geometry = match mode {
        ScreenMode::Fullscreen => ScreenGeometry {
            x: position.0,
            y: position.1,
            width: resolution.0 - (resolution.0 % 2),
            height: resolution.1 - (resolution.1 % 2),
        },
        ScreenMode::Area => {
            let area = area
                .ok_or_else(|| {
                    RecorderError::InvalidTask("area mode requires a selected rectangle".into())
                })?
                .even_aligned();
            if area.is_empty() {
                return Err(RecorderError::InvalidTask(
                    "selected area is too small to encode".into(),
                ));
            }
            ScreenGeometry {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height,
            }
        }
    };
    Ok(geometry)
}

/// Per-OS capture mapping strategy.
///
/// Each method returns the input specification for one task kind; the
/// default implementations fail with `UnsupportedPlatform` so an OS only
/// implements what it actually supports.
pub trait InputResolver: Send + Sync {
    fn os(&self) -> Os;

    fn screen_input(&self, geometry: ScreenGeometry, monitor_id: u32) -> RecorderResult<InputSpec> {
        let _ = (geometry, monitor_id);
        Err(RecorderError::UnsupportedPlatform {
            os: self.os().name(),
            task_kind: "screen",
        })
    }

    fn webcam_input(&self, device_id: u32, device_name: &str) -> RecorderResult<InputSpec> {
        let _ = (device_id, device_name);
        Err(RecorderError::UnsupportedPlatform {
            os: self.os().name(),
            task_kind: "webcam",
        })
    }

    fn audio_input(&self, device_id: &str, device_name: &str) -> RecorderResult<InputSpec> {
        let _ = (device_id, device_name);
        Err(RecorderError::UnsupportedPlatform {
            os: self.os().name(),
            task_kind: "audio",
        })
    }

    /// Resolve any capture task to its FFmpeg input specification.
    fn resolve(&self, task: &CaptureTask) -> RecorderResult<InputSpec> {
        match task {
            CaptureTask::Screen {
                monitor_id,
                mode,
                position,
                resolution,
                area,
            } => {
                let geometry = screen_geometry(*mode, *position, *resolution, *area)?;
                self.screen_input(geometry, *monitor_id)
            }
            CaptureTask::Webcam {
                device_id,
                device_name,
            } => self.webcam_input(*device_id, device_name),
            CaptureTask::Audio {
                device_id,
                device_name,
                ..
            } => self.audio_input(device_id, device_name),
        }
    }
}

/// Select the resolver for an operating system.
pub fn resolver_for(os: Os) -> Box<dyn InputResolver> {
    match os {
        Os::Windows => Box::new(windows::WindowsResolver),
        Os::Linux => Box::new(linux::LinuxResolver),
        Os::MacOs => Box::new(macos::MacOsResolver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_task(width: u32, height: u32) -> CaptureTask {
        CaptureTask::Screen {
            monitor_id: 0,
            mode: ScreenMode::Area,
            position: (0, 0),
            resolution: (1920, 1080),
            area: Some(AreaGeometry {
                x: 10,
                y: 20,
                width,
                height,
            }),
        }
    }

    #[test]
    fn odd_area_dimensions_are_normalized_before_resolution() {
        let resolver = resolver_for(Os::Linux);
        let spec = resolver.resolve(&area_task(101, 51)).unwrap();
        assert_eq!(spec.video_size, Some((100, 50)));
    }

    #[test]
    fn area_mode_without_geometry_is_rejected() {
        let task = CaptureTask::Screen {
            monitor_id: 0,
            mode: ScreenMode::Area,
            position: (0, 0),
            resolution: (1920, 1080),
            area: None,
        };
        let err = resolver_for(Os::Linux).resolve(&task).unwrap_err();
        assert!(matches!(err, RecorderError::InvalidTask(_)));
    }

    #[test]
    fn degenerate_area_is_rejected() {
        let err = resolver_for(Os::Linux).resolve(&area_task(1, 1)).unwrap_err();
        assert!(matches!(err, RecorderError::InvalidTask(_)));
    }

    #[test]
    fn input_options_precede_the_source() {
        let spec = InputSpec {
            demuxer: "x11grab",
            source: ":0.0+0,0".to_string(),
            video_size: Some((1920, 1080)),
            framerate: Some(VIDEO_FRAMERATE),
            offset: None,
            pixel_format: None,
            channels: None,
            draw_mouse: true,
        };
        let args = spec.to_args();
        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(i_pos, args.len() - 2);
        assert_eq!(args.last().unwrap(), ":0.0+0,0");
        assert!(args.windows(2).any(|w| w == ["-video_size", "1920x1080"]));
        assert!(args.windows(2).any(|w| w == ["-draw_mouse", "1"]));
    }
}
