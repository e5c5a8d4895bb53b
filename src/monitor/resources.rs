//! Resource guard
//!
//! Watches free disk space at the session path and available system
//! memory while recording. Each resource kind warns at most once per
//! guard lifetime; repeated breaches stay silent.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::recorder::event::{RecorderEvent, ResourceKind};

const GIB: f64 = (1024u64 * 1024 * 1024) as f64;

/// One-shot threshold logic, kept separate from the polling loop.
#[derive(Debug)]
pub struct GuardState {
    disk_threshold: u64,
    memory_threshold: u64,
    disk_warned: bool,
    memory_warned: bool,
}

impl GuardState {
    pub fn new(disk_threshold: u64, memory_threshold: u64) -> Self {
        Self {
            disk_threshold,
            memory_threshold,
            disk_warned: false,
            memory_warned: false,
        }
    }

    /// Evaluate one sample. Returns the warnings to emit, at most one per
    /// resource kind over the lifetime of this state.
    pub fn evaluate(
        &mut self,
        free_disk: Option<u64>,
        available_memory: u64,
    ) -> Vec<(ResourceKind, String)> {
        let mut warnings = Vec::new();

        if !self.disk_warned {
            if let Some(free) = free_disk {
                if free < self.disk_threshold {
                    self.disk_warned = true;
                    warnings.push((
                        ResourceKind::Disk,
                        format!(
                            "Disk space is critically low! Only {:.2} GiB remaining.",
                            free as f64 / GIB
                        ),
                    ));
                }
            }
        }

        if !self.memory_warned && available_memory < self.memory_threshold {
            self.memory_warned = true;
            warnings.push((
                ResourceKind::Memory,
                format!(
                    "Available RAM is critically low! Only {:.2} GiB remaining.",
                    available_memory as f64 / GIB
                ),
            ));
        }

        warnings
    }
}

/// Background disk/memory watcher for one session directory.
pub struct ResourceGuard {
    stop_flag: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ResourceGuard {
    pub fn spawn(
        watch_path: PathBuf,
        disk_threshold: u64,
        memory_threshold: u64,
        interval: Duration,
        events: broadcast::Sender<RecorderEvent>,
    ) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop_flag);

        let handle = tokio::spawn(async move {
            let mut state = GuardState::new(disk_threshold, memory_threshold);
            let mut system = System::new();
            let mut disks = Disks::new_with_refreshed_list();

            while !flag.load(Ordering::SeqCst) {
                disks.refresh();
                system.refresh_memory();

                let free_disk = free_disk_at(&disks, &watch_path);
                for (kind, message) in state.evaluate(free_disk, system.available_memory()) {
                    tracing::warn!("{message}");
                    let _ = events.send(RecorderEvent::ResourceWarning { kind, message });
                }

                tokio::time::sleep(interval).await;
            }
        });

        Self { stop_flag, handle }
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Free space on the disk holding `path`: the mounted disk with the
/// longest mount-point prefix of the watched path.
fn free_disk_at(disks: &Disks, path: &Path) -> Option<u64> {
    disks
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
}
