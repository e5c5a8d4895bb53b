//! Encoder process launcher
//!
//! Assembles the full FFmpeg invocation for one capture task (input half
//! from the platform resolver, output half from the fixed encoding
//! profiles) and spawns the subprocess with all three standard streams
//! piped: stdin for the graceful-quit byte, stdout/stderr for the log
//! aggregator.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{RecorderError, RecorderResult};
use crate::platform::{InputSpec, VIDEO_FRAMERATE};
use crate::recorder::session::ProcessRecord;
use crate::registry;
use crate::task::{sanitize_filename, CaptureTask};

/// Audio encoding bitrate
const AUDIO_BITRATE: &str = "192k";

/// Launches one encoder subprocess per capture task.
pub struct ProcessLauncher {
    program: String,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Preflight check that the encoder binary is runnable at all.
    pub fn encoder_available(&self) -> bool {
        std::process::Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    /// Output file for a task: `<dir>/<sanitized label>.<ext>`.
    pub fn output_path(&self, task: &CaptureTask, output_dir: &Path) -> PathBuf {
        output_dir.join(format!(
            "{}.{}",
            sanitize_filename(&task.label()),
            task.extension()
        ))
    }

    /// Full argument vector: overwrite flag, resolved input, fixed
    /// encoding profile, output path.
    pub fn build_args(
        &self,
        task: &CaptureTask,
        input: &InputSpec,
        output_path: &Path,
    ) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        args.extend(input.to_args());
        if task.is_video() {
            args.extend(
                [
                    "-c:v",
                    "libx264",
                    "-pix_fmt",
                    "yuv420p",
                    "-r",
                    &VIDEO_FRAMERATE.to_string(),
                ]
                .map(str::to_string),
            );
        } else {
            args.extend(["-c:a", "libmp3lame", "-b:a", AUDIO_BITRATE].map(str::to_string));
        }
        args.push(output_path.to_string_lossy().to_string());
        args
    }

    /// Spawn the encoder for one task. Failure affects this task only;
    /// the caller decides whether a start with partial failures proceeds.
    pub async fn launch(
        &self,
        task: &CaptureTask,
        input: &InputSpec,
        output_dir: &Path,
    ) -> RecorderResult<ProcessRecord> {
        let label = task.label();
        let output_path = self.output_path(task, output_dir);
        let args = self.build_args(task, input, &output_path);

        tracing::info!("Starting process for {label}: {} {}", self.program, args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RecorderError::Launch {
                label: label.clone(),
                source,
            })?;

        let record = ProcessRecord::new(label, output_path, child);
        registry::track(record.pid());

        tracing::info!("Process for {} started with PID {}", record.label(), record.pid());
        Ok(record)
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}
