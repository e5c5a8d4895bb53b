//! Windows capture mappings: gdigrab for the desktop, dshow for devices.

use super::{InputResolver, InputSpec, Os, ScreenGeometry};
use crate::error::RecorderResult;
use crate::task::strip_annotation;

pub struct WindowsResolver;

impl InputResolver for WindowsResolver {
    fn os(&self) -> Os {
        Os::Windows
    }

    fn screen_input(&self, geometry: ScreenGeometry, _monitor_id: u32) -> RecorderResult<InputSpec> {
        // gdigrab captures the whole virtual desktop; the monitor is
        // selected purely by pixel offset.
        let mut spec = InputSpec::video("gdigrab", "desktop".to_string());
        spec.offset = Some((geometry.x, geometry.y));
        spec.video_size = Some((geometry.width, geometry.height));
        spec.draw_mouse = true;
        Ok(spec)
    }

    fn webcam_input(&self, device_id: u32, _device_name: &str) -> RecorderResult<InputSpec> {
        Ok(InputSpec::video(
            "dshow",
            format!("video=Webcam {device_id}"),
        ))
    }

    fn audio_input(&self, _device_id: &str, device_name: &str) -> RecorderResult<InputSpec> {
        // dshow addresses audio devices by display name, without the
        // catalog's [Input]/[Output] annotation.
        Ok(InputSpec::audio(
            "dshow",
            format!("audio={}", strip_annotation(device_name)),
        ))
    }
}
