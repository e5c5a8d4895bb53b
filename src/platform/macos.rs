//! macOS capture mappings via avfoundation.
//!
//! avfoundation sources are `"<video>:<audio>"` index pairs. The catalog's
//! indices are assumed to line up with avfoundation's device table; that
//! mapping is by convention, not verified at runtime.

use super::{InputResolver, InputSpec, Os, ScreenGeometry};
use crate::error::{RecorderError, RecorderResult};

pub struct MacOsResolver;

impl InputResolver for MacOsResolver {
    fn os(&self) -> Os {
        Os::MacOs
    }

    fn screen_input(&self, geometry: ScreenGeometry, monitor_id: u32) -> RecorderResult<InputSpec> {
        // Screen devices are indexed after the cameras; the capture is
        // video-only and avfoundation crops via video_size.
        let mut spec = InputSpec::video("avfoundation", format!("{monitor_id}:none"));
        spec.video_size = Some((geometry.width, geometry.height));
        Ok(spec)
    }

    fn webcam_input(&self, device_id: u32, _device_name: &str) -> RecorderResult<InputSpec> {
        Ok(InputSpec::video("avfoundation", format!("{device_id}:none")))
    }

    fn audio_input(&self, device_id: &str, _device_name: &str) -> RecorderResult<InputSpec> {
        // Audio-only capture wants a numeric avfoundation index.
        let index: u32 = device_id.parse().map_err(|_| {
            RecorderError::InvalidTask(format!(
                "macos audio capture needs a numeric device index, got {device_id:?}"
            ))
        })?;
        Ok(InputSpec::audio("avfoundation", format!("none:{index}")))
    }
}
