//! Linux capture mappings: x11grab for screens, v4l2 for webcams, pulse
//! for audio.

use super::{InputResolver, InputSpec, Os, ScreenGeometry};
use crate::error::RecorderResult;

pub struct LinuxResolver;

fn display() -> String {
    std::env::var("DISPLAY").unwrap_or_else(|_| ":0.0".to_string())
}

impl InputResolver for LinuxResolver {
    fn os(&self) -> Os {
        Os::Linux
    }

    fn screen_input(&self, geometry: ScreenGeometry, _monitor_id: u32) -> RecorderResult<InputSpec> {
        // x11grab encodes the offset in the source string itself.
        let mut spec = InputSpec::video(
            "x11grab",
            format!("{}+{},{}", display(), geometry.x, geometry.y),
        );
        spec.video_size = Some((geometry.width, geometry.height));
        spec.draw_mouse = true;
        Ok(spec)
    }

    fn webcam_input(&self, device_id: u32, _device_name: &str) -> RecorderResult<InputSpec> {
        let mut spec = InputSpec::video("v4l2", format!("/dev/video{device_id}"));
        spec.pixel_format = Some("yuyv422");
        Ok(spec)
    }

    fn audio_input(&self, device_id: &str, _device_name: &str) -> RecorderResult<InputSpec> {
        // The catalog id is already the PulseAudio source name.
        Ok(InputSpec::audio("pulse", device_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_embeds_offset_in_display_source() {
        let spec = LinuxResolver
            .screen_input(
                ScreenGeometry {
                    x: 100,
                    y: 200,
                    width: 1280,
                    height: 720,
                },
                0,
            )
            .unwrap();
        assert_eq!(spec.demuxer, "x11grab");
        assert!(spec.source.ends_with("+100,200"));
        assert_eq!(spec.video_size, Some((1280, 720)));
        assert_eq!(spec.offset, None);
    }

    #[test]
    fn webcam_uses_device_node_with_explicit_pixel_format() {
        let spec = LinuxResolver.webcam_input(3, "USB Camera").unwrap();
        assert_eq!(spec.demuxer, "v4l2");
        assert_eq!(spec.source, "/dev/video3");
        assert_eq!(spec.pixel_format, Some("yuyv422"));
    }

    #[test]
    fn audio_passes_pulse_id_verbatim() {
        let spec = LinuxResolver
            .audio_input("alsa_output.pci.monitor", "[Output] Speakers")
            .unwrap();
        assert_eq!(spec.demuxer, "pulse");
        assert_eq!(spec.source, "alsa_output.pci.monitor");
        assert_eq!(spec.channels, Some(2));
        assert_eq!(spec.framerate, None);
    }
}
