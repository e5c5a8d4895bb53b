//! Project session and process records
//!
//! A session owns one output directory and the records of every encoder
//! subprocess launched for it. Records are appended by the launch sequence
//! and drained by the shutdown coordinator; monitors only ever see
//! read-only `ProcessHandle` snapshots.

use chrono::{DateTime, Local, Utc};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::sync::Mutex;

use crate::error::RecorderResult;
use crate::recorder::event::ProcessStatus;

/// The orchestrator's handle to one spawned encoder subprocess.
#[derive(Debug)]
pub struct ProcessRecord {
    label: String,
    pid: u32,
    started_at: DateTime<Utc>,
    output_path: PathBuf,
    child: Arc<Mutex<Child>>,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    status: Arc<RwLock<ProcessStatus>>,
}

impl ProcessRecord {
    pub(crate) fn new(label: String, output_path: PathBuf, mut child: Child) -> Self {
        let pid = child.id().unwrap_or_default();
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        Self {
            label,
            pid,
            started_at: Utc::now(),
            output_path,
            child: Arc::new(Mutex::new(child)),
            stdin,
            stdout,
            stderr,
            status: Arc::new(RwLock::new(ProcessStatus::Pending)),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Read-only snapshot for the monitors.
    pub fn handle(&self) -> ProcessHandle {
        ProcessHandle {
            label: self.label.clone(),
            pid: self.pid,
            child: Arc::clone(&self.child),
            status: Arc::clone(&self.status),
        }
    }

    pub(crate) fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.stdin.take()
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub(crate) fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }
}

/// Cloneable, read-only view of a process record.
///
/// Monitors poll liveness and record status transitions through this
/// handle; they never touch the session's record collection.
#[derive(Clone)]
pub struct ProcessHandle {
    label: String,
    pid: u32,
    child: Arc<Mutex<Child>>,
    status: Arc<RwLock<ProcessStatus>>,
}

impl ProcessHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn status(&self) -> ProcessStatus {
        *self.status.read()
    }

    /// Record a status transition. Terminal statuses are sticky: once a
    /// process leaves `Running` it never returns. Returns whether the
    /// status actually changed.
    pub fn set_status(&self, next: ProcessStatus) -> bool {
        let mut current = self.status.write();
        if current.is_terminal() || *current == next {
            return false;
        }
        *current = next;
        true
    }

    /// Non-blocking liveness check of the underlying process.
    pub async fn try_wait(&self) -> std::io::Result<Option<ExitStatus>> {
        self.child.lock().await.try_wait()
    }

    /// Exclusive access to the child for the shutdown sequence.
    pub(crate) async fn lock_child_owned(&self) -> tokio::sync::OwnedMutexGuard<Child> {
        Arc::clone(&self.child).lock_owned().await
    }
}

/// One recording run: the output directory plus every process record.
pub struct ProjectSession {
    directory: PathBuf,
    records: Vec<ProcessRecord>,
}

impl ProjectSession {
    /// Create the session directory `<base>/Multi_Recorder_<timestamp>/`
    /// and an empty record set. Creation is idempotent; an existing
    /// directory is reused.
    pub fn create(base_dir: Option<&Path>) -> RecorderResult<Self> {
        let base = base_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(default_base_dir);
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let directory = base.join(format!("Multi_Recorder_{timestamp}"));
        std::fs::create_dir_all(&directory)?;

        tracing::info!("Created project directory: {}", directory.display());

        Ok(Self {
            directory,
            records: Vec::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn push(&mut self, record: ProcessRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [ProcessRecord] {
        &mut self.records
    }

    pub fn handles(&self) -> Vec<ProcessHandle> {
        self.records.iter().map(ProcessRecord::handle).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Remove and return every record, leaving the session empty.
    pub(crate) fn drain_records(&mut self) -> Vec<ProcessRecord> {
        std::mem::take(&mut self.records)
    }

    /// Persist a text log into the session directory, so hosts can keep
    /// aggregated application/encoder output next to the recordings.
    pub fn write_log_file(&self, name: &str, contents: &str) -> RecorderResult<()> {
        std::fs::write(self.directory.join(name), contents)?;
        Ok(())
    }
}

/// Default output location when the host configures none.
fn default_base_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join("Videos")
}
