//! Recording orchestration
//!
//! The coordinator and its collaborators: launching encoder subprocesses,
//! the session that owns their records, the event channel, and the
//! graceful shutdown sequence.

pub mod coordinator;
pub mod event;
pub mod launcher;
pub mod session;
pub mod shutdown;

pub use coordinator::{RecordingCoordinator, RecordingState, StartSummary};
pub use event::{ProcessStatus, RecorderEvent, ResourceKind, StreamKind};
pub use launcher::ProcessLauncher;
pub use session::{ProcessHandle, ProcessRecord, ProjectSession};
pub use shutdown::ShutdownCoordinator;
