//! Multi Recorder - failsafe multi-source recording.
//!
//! Coordinates simultaneous, independently-failing capture sessions by
//! launching one FFmpeg subprocess per selected source (screen, webcam or
//! audio device) and supervising them until recording stops. A failure in
//! one source never aborts the others, and shutdown is bounded in time even
//! when an encoder ignores its graceful-stop signal.

pub mod config;
pub mod device;
pub mod error;
pub mod monitor;
pub mod platform;
pub mod recorder;
pub mod registry;
pub mod task;

pub use config::RecorderConfig;
pub use error::{RecorderError, RecorderResult};
pub use recorder::{RecorderEvent, RecordingCoordinator, RecordingState, StartSummary};
pub use task::CaptureTask;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for host applications that have no
/// subscriber of their own.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multi_recorder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("multi-recorder v{} initialized", env!("CARGO_PKG_VERSION"));
}
