//! Process health monitor
//!
//! Polls every tracked subprocess at a fixed interval. Alive processes
//! re-emit `Running`; an exit is reported exactly once as `ExitedOk` or
//! `ExitedError`, after which the record is terminal and skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::recorder::event::{ProcessStatus, RecorderEvent};
use crate::recorder::session::ProcessHandle;
use crate::registry;

pub struct ProcessHealthMonitor {
    stop_flag: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ProcessHealthMonitor {
    /// Start polling the given process handles.
    pub fn spawn(
        processes: Vec<ProcessHandle>,
        interval: Duration,
        events: broadcast::Sender<RecorderEvent>,
    ) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop_flag);

        let handle = tokio::spawn(async move {
            while !flag.load(Ordering::SeqCst) {
                for process in &processes {
                    poll_process(process, &events).await;
                }
                tokio::time::sleep(interval).await;
            }
        });

        Self { stop_flag, handle }
    }

    /// Halt further polling. Does not wait for tracked subprocesses, and
    /// the current iteration may still finish.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

async fn poll_process(process: &ProcessHandle, events: &broadcast::Sender<RecorderEvent>) {
    if process.status().is_terminal() {
        return;
    }

    match process.try_wait().await {
        Ok(None) => {
            process.set_status(ProcessStatus::Running);
            let _ = events.send(RecorderEvent::Status {
                label: process.label().to_string(),
                pid: process.pid(),
                status: ProcessStatus::Running,
            });
        }
        Ok(Some(exit)) => {
            let status = if exit.success() {
                ProcessStatus::ExitedOk
            } else {
                ProcessStatus::ExitedError
            };
            // set_status is the once-only gate; a concurrent shutdown may
            // already have claimed the terminal transition.
            if process.set_status(status) {
                tracing::info!(
                    "{} (pid {}) exited with {exit}",
                    process.label(),
                    process.pid()
                );
                registry::untrack(process.pid());
                let _ = events.send(RecorderEvent::Status {
                    label: process.label().to_string(),
                    pid: process.pid(),
                    status,
                });
            }
        }
        Err(e) => {
            tracing::debug!("liveness poll for {} failed: {e}", process.label());
        }
    }
}
