//! Graceful-then-forceful shutdown
//!
//! Drives every process record of a session to termination in bounded
//! time: quit byte on stdin, bounded wait, then a kill that blocks until
//! the OS confirms. A failure on one record never aborts the rest.

use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use crate::recorder::event::ProcessStatus;
use crate::recorder::session::{ProcessRecord, ProjectSession};
use crate::registry;

/// Byte the encoder understands as "stop encoding and finalize output".
const QUIT_BYTE: &[u8] = b"q";

pub struct ShutdownCoordinator {
    grace: Duration,
}

impl ShutdownCoordinator {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Stop every process of the session and drain its record collection.
    ///
    /// Idempotent: a second call, or a call on a session with zero
    /// records, does nothing.
    pub async fn stop(&self, session: &mut ProjectSession) {
        let records = session.drain_records();
        if records.is_empty() {
            return;
        }

        let count = records.len();
        for record in records {
            self.stop_record(record).await;
        }
        tracing::info!("Stopped {count} recording processes");
    }

    async fn stop_record(&self, mut record: ProcessRecord) {
        let label = record.label().to_string();
        let pid = record.pid();
        let handle = record.handle();
        let stdin = record.take_stdin();

        let mut guard = handle.lock_child_owned().await;

        // Re-check liveness: a process that already exited counts as
        // success, not an error.
        match guard.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!("{label} (pid {pid}) already exited: {status}");
                handle.set_status(ProcessStatus::Stopped);
                registry::untrack(pid);
                return;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("liveness check for {label} (pid {pid}) failed: {e}");
            }
        }

        // Graceful quit: one byte on stdin, then close the pipe so an
        // encoder that only watches for EOF stops as well.
        if let Some(mut stdin) = stdin {
            if let Err(e) = stdin.write_all(QUIT_BYTE).await {
                tracing::debug!("could not send quit byte to {label}: {e}");
            }
            drop(stdin);
        }

        match timeout(self.grace, guard.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!("{label} (pid {pid}) exited gracefully: {status}");
            }
            Ok(Err(e)) => {
                tracing::warn!("waiting on {label} (pid {pid}) failed: {e}");
            }
            Err(_) => {
                tracing::warn!(
                    "{label} (pid {pid}) ignored quit signal for {:?}, killing",
                    self.grace
                );
                if let Err(e) = guard.kill().await {
                    tracing::error!("failed to kill {label} (pid {pid}): {e}");
                }
            }
        }

        handle.set_status(ProcessStatus::Stopped);
        registry::untrack(pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::process::Stdio;
    use std::time::Instant;
    use tokio::process::Command;

    fn spawn_record(label: &str, program: &str, args: &[&str]) -> ProcessRecord {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let record = ProcessRecord::new(label.into(), PathBuf::from("out"), child);
        registry::track(record.pid());
        record
    }

    fn session_with(records: Vec<ProcessRecord>) -> ProjectSession {
        let base = tempfile::tempdir().unwrap();
        let mut session = ProjectSession::create(Some(base.path())).unwrap();
        for record in records {
            session.push(record);
        }
        session
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn quit_byte_stops_cooperative_process() {
        // Exits as soon as one byte arrives on stdin.
        let record = spawn_record("Audio Mic", "sh", &["-c", "head -c1 >/dev/null"]);
        let pid = record.pid();
        let handle = record.handle();
        let mut session = session_with(vec![record]);

        let coordinator = ShutdownCoordinator::new(Duration::from_secs(3));
        let start = Instant::now();
        coordinator.stop(&mut session).await;

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(session.is_empty());
        assert_eq!(handle.status(), ProcessStatus::Stopped);
        assert!(!registry::tracked().contains(&pid));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unresponsive_process_is_killed_after_grace() {
        let record = spawn_record("Screen 0", "sleep", &["30"]);
        let handle = record.handle();
        let mut session = session_with(vec![record]);

        let coordinator = ShutdownCoordinator::new(Duration::from_millis(200));
        let start = Instant::now();
        coordinator.stop(&mut session).await;

        // Bounded: grace period plus kill confirmation, nowhere near 30s.
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(session.is_empty());
        assert_eq!(handle.status(), ProcessStatus::Stopped);
        assert!(matches!(handle.try_wait().await, Ok(Some(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_is_idempotent() {
        let record = spawn_record("Screen 0", "true", &[]);
        let mut session = session_with(vec![record]);

        let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
        coordinator.stop(&mut session).await;
        assert!(session.is_empty());

        // Second call and empty-session call are no-ops.
        coordinator.stop(&mut session).await;
        assert!(session.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn already_exited_process_is_tolerated() {
        let record = spawn_record("Webcam Cam", "true", &[]);
        let handle = record.handle();
        let mut session = session_with(vec![record]);

        // Give the process time to exit before shutdown runs.
        tokio::time::sleep(Duration::from_millis(200)).await;
        ShutdownCoordinator::new(Duration::from_secs(1))
            .stop(&mut session)
            .await;

        assert!(session.is_empty());
        assert_eq!(handle.status(), ProcessStatus::Stopped);
    }
}
