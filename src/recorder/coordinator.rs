//! Recording coordinator
//!
//! The single entry point hosts drive: resolve the selected capture tasks
//! for this platform, create the session directory, launch one encoder per
//! task, wire up the supervision loops, and tear everything down again.
//! One coordinator handles one recording at a time.

use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::RecorderConfig;
use crate::error::{RecorderError, RecorderResult};
use crate::monitor::{LogAggregator, ProcessHealthMonitor, ResourceGuard};
use crate::platform::{resolver_for, InputResolver, Os};
use crate::recorder::event::RecorderEvent;
use crate::recorder::launcher::ProcessLauncher;
use crate::recorder::session::{ProcessHandle, ProjectSession};
use crate::recorder::shutdown::ShutdownCoordinator;
use crate::task::CaptureTask;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Outcome of a start call with per-task failure tolerance.
#[derive(Debug)]
pub struct StartSummary {
    pub session_dir: PathBuf,
    /// Labels of the processes that launched
    pub launched: Vec<String>,
    /// Labels that failed to resolve or spawn, with the reason
    pub failed: Vec<(String, RecorderError)>,
}

pub struct RecordingCoordinator {
    config: RecorderConfig,
    resolver: Box<dyn InputResolver>,
    launcher: ProcessLauncher,
    state: Arc<RwLock<RecordingState>>,
    session: Option<ProjectSession>,
    event_tx: broadcast::Sender<RecorderEvent>,
    health: Option<ProcessHealthMonitor>,
    guard: Option<ResourceGuard>,
    logs: Option<LogAggregator>,
    shutdown: ShutdownCoordinator,
}

impl RecordingCoordinator {
    /// Coordinator for the platform we are running on.
    pub fn new(config: RecorderConfig) -> RecorderResult<Self> {
        let os = Os::detect()?;
        Ok(Self::with_os(config, os))
    }

    /// Coordinator with an explicit platform, mainly for argv inspection
    /// off the host platform.
    pub fn with_os(config: RecorderConfig, os: Os) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let launcher = ProcessLauncher::new(config.ffmpeg_program.clone());
        let shutdown = ShutdownCoordinator::new(config.shutdown_grace());
        Self {
            config,
            resolver: resolver_for(os),
            launcher,
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            session: None,
            event_tx,
            health: None,
            guard: None,
            logs: None,
            shutdown,
        }
    }

    /// New receiver for session events. Subscribing is valid at any time;
    /// a late subscriber only sees events from then on.
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    /// Preflight check that the configured encoder binary runs.
    pub fn encoder_available(&self) -> bool {
        self.launcher.encoder_available()
    }

    /// Snapshot of every process of the active session.
    pub fn active_processes(&self) -> Vec<ProcessHandle> {
        self.session
            .as_ref()
            .map(ProjectSession::handles)
            .unwrap_or_default()
    }

    /// Start recording the given tasks.
    ///
    /// Each task resolves and launches independently; a failure is
    /// reported in the summary without aborting the rest. Errors only if
    /// a recording is already active or no task launched at all.
    pub async fn start(&mut self, tasks: &[CaptureTask]) -> RecorderResult<StartSummary> {
        {
            let mut state = self.state.write();
            if *state == RecordingState::Recording {
                return Err(RecorderError::AlreadyRecording);
            }
            *state = RecordingState::Recording;
        }

        match self.start_inner(tasks).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                *self.state.write() = RecordingState::Idle;
                Err(e)
            }
        }
    }

    async fn start_inner(&mut self, tasks: &[CaptureTask]) -> RecorderResult<StartSummary> {
        let mut session = ProjectSession::create(self.config.base_dir.as_deref())?;
        let mut launched = Vec::new();
        let mut failed = Vec::new();

        for task in tasks {
            let label = task.label();
            let outcome = match self.resolver.resolve(task) {
                Ok(input) => {
                    self.launcher
                        .launch(task, &input, session.directory())
                        .await
                }
                Err(e) => Err(e),
            };
            match outcome {
                Ok(record) => {
                    launched.push(record.label().to_string());
                    session.push(record);
                }
                Err(e) => {
                    tracing::error!("Failed to start recording for {label}: {e}");
                    failed.push((label, e));
                }
            }
        }

        if session.is_empty() {
            return Err(RecorderError::NothingStarted);
        }

        let mut logs = LogAggregator::new();
        for record in session.records_mut() {
            logs.attach(record, self.event_tx.clone());
        }
        self.logs = Some(logs);

        self.health = Some(ProcessHealthMonitor::spawn(
            session.handles(),
            self.config.health_poll_interval(),
            self.event_tx.clone(),
        ));
        self.guard = Some(ResourceGuard::spawn(
            session.directory().to_path_buf(),
            self.config.disk_threshold_bytes,
            self.config.memory_threshold_bytes,
            self.config.resource_poll_interval(),
            self.event_tx.clone(),
        ));

        let session_dir = session.directory().to_path_buf();
        tracing::info!(
            "Recording started: {} of {} processes in {}",
            launched.len(),
            tasks.len(),
            session_dir.display()
        );
        let _ = self.event_tx.send(RecorderEvent::Started {
            directory: session_dir.clone(),
        });

        self.session = Some(session);
        Ok(StartSummary {
            session_dir,
            launched,
            failed,
        })
    }

    /// Stop the active recording. Calling with no active recording is a
    /// no-op, so hosts can wire this into exit paths unconditionally.
    pub async fn stop(&mut self) {
        if let Some(health) = self.health.take() {
            health.stop();
        }
        if let Some(guard) = self.guard.take() {
            guard.stop();
        }

        if let Some(mut session) = self.session.take() {
            self.shutdown.stop(&mut session).await;
            let _ = self.event_tx.send(RecorderEvent::Stopped);
        }

        // Log readers drain remaining pipe output and end at EOF.
        if let Some(logs) = self.logs.take() {
            logs.stop();
        }

        *self.state.write() = RecordingState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{AreaGeometry, ScreenMode};
    use std::time::Duration;

    fn test_config(base: &std::path::Path) -> RecorderConfig {
        let mut config = RecorderConfig::default();
        config.base_dir = Some(base.to_path_buf());
        // `true` exits immediately but accepts any argv.
        config.ffmpeg_program = "true".to_string();
        config.health_poll_ms = 50;
        config.shutdown_grace_ms = 500;
        config
    }

    fn fullscreen_task(monitor_id: u32) -> CaptureTask {
        CaptureTask::Screen {
            monitor_id,
            mode: ScreenMode::Fullscreen,
            position: (0, 0),
            resolution: (1920, 1080),
            area: None,
        }
    }

    fn broken_area_task() -> CaptureTask {
        CaptureTask::Screen {
            monitor_id: 1,
            mode: ScreenMode::Area,
            position: (0, 0),
            resolution: (1920, 1080),
            area: Some(AreaGeometry {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            }),
        }
    }

    #[tokio::test]
    async fn start_with_no_tasks_is_an_error() {
        let base = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_os(test_config(base.path()), Os::Linux);

        let err = coordinator.start(&[]).await.unwrap_err();
        assert!(matches!(err, RecorderError::NothingStarted));
        assert_eq!(coordinator.state(), RecordingState::Idle);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn one_bad_task_does_not_abort_the_rest() {
        let base = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_os(test_config(base.path()), Os::Linux);

        let summary = coordinator
            .start(&[fullscreen_task(0), broken_area_task()])
            .await
            .unwrap();

        assert_eq!(summary.launched, vec!["Screen 0".to_string()]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "Screen 1");
        assert!(matches!(summary.failed[0].1, RecorderError::InvalidTask(_)));
        assert_eq!(coordinator.state(), RecordingState::Recording);
        assert_eq!(coordinator.active_processes().len(), 1);

        coordinator.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn double_start_is_rejected_until_stop() {
        let base = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_os(test_config(base.path()), Os::Linux);

        coordinator.start(&[fullscreen_task(0)]).await.unwrap();
        let err = coordinator.start(&[fullscreen_task(0)]).await.unwrap_err();
        assert!(matches!(err, RecorderError::AlreadyRecording));

        coordinator.stop().await;
        assert_eq!(coordinator.state(), RecordingState::Idle);

        // A fresh session may start again afterwards.
        coordinator.start(&[fullscreen_task(0)]).await.unwrap();
        coordinator.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn emits_started_and_stopped_events() {
        let base = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_os(test_config(base.path()), Os::Linux);
        let mut rx = coordinator.subscribe();

        let summary = coordinator.start(&[fullscreen_task(0)]).await.unwrap();
        coordinator.stop().await;

        let mut saw_started = false;
        let mut saw_stopped = false;
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while let Ok(Ok(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
            match event {
                RecorderEvent::Started { directory } => {
                    assert_eq!(directory, summary.session_dir);
                    saw_started = true;
                }
                RecorderEvent::Stopped => {
                    saw_stopped = true;
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_started);
        assert!(saw_stopped);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let base = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_os(test_config(base.path()), Os::Linux);
        coordinator.stop().await;
        assert_eq!(coordinator.state(), RecordingState::Idle);
        assert!(coordinator.active_processes().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_marks_every_process_terminal() {
        let base = tempfile::tempdir().unwrap();
        let mut coordinator = RecordingCoordinator::with_os(test_config(base.path()), Os::Linux);

        coordinator.start(&[fullscreen_task(0)]).await.unwrap();
        let handles = coordinator.active_processes();
        coordinator.stop().await;

        // The health monitor may have claimed an exit before shutdown ran,
        // so the exact terminal status varies.
        for handle in handles {
            assert!(handle.status().is_terminal());
        }
    }
}
