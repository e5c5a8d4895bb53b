//! Global PID registry
//!
//! Process-wide set of every encoder PID spawned and not yet reaped.
//! The launch path tracks a PID, the shutdown and health paths untrack
//! it. Hosts call [`kill_orphans`] from an exit hook so an abnormal
//! teardown never strands encoder processes.
//!
//! Global on purpose: an exit hook runs after the coordinator and its
//! sessions are gone, so the cleanup set cannot live inside them.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use sysinfo::{Pid, ProcessRefreshKind, System};

static TRACKED_PIDS: Mutex<BTreeSet<u32>> = Mutex::new(BTreeSet::new());

/// Register a freshly spawned encoder PID for exit-hook cleanup.
pub fn track(pid: u32) {
    TRACKED_PIDS.lock().insert(pid);
}

/// Remove a PID once the process has been reaped.
pub fn untrack(pid: u32) {
    TRACKED_PIDS.lock().remove(&pid);
}

/// Snapshot of every PID currently tracked.
pub fn tracked() -> BTreeSet<u32> {
    TRACKED_PIDS.lock().clone()
}

/// Kill every still-tracked process and clear the registry. Returns how
/// many processes were actually signalled.
///
/// Best effort: PIDs whose process is already gone are just dropped.
pub fn kill_orphans() -> usize {
    let pids: Vec<u32> = {
        let mut tracked = TRACKED_PIDS.lock();
        std::mem::take(&mut *tracked).into_iter().collect()
    };
    if pids.is_empty() {
        return 0;
    }

    let mut system = System::new();
    let mut killed = 0;
    for pid in pids {
        let sys_pid = Pid::from_u32(pid);
        system.refresh_process_specifics(sys_pid, ProcessRefreshKind::new());
        if let Some(process) = system.process(sys_pid) {
            if process.kill() {
                tracing::warn!("killed orphaned encoder process {pid}");
                killed += 1;
            }
        }
    }
    killed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_and_untrack_round_trip() {
        track(987_654_321);
        assert!(tracked().contains(&987_654_321));
        untrack(987_654_321);
        assert!(!tracked().contains(&987_654_321));
    }

    #[test]
    fn untrack_of_unknown_pid_is_a_no_op() {
        untrack(123_456_789);
        assert!(!tracked().contains(&123_456_789));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn kill_orphans_reaps_a_tracked_process() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();
        track(pid);

        assert!(kill_orphans() >= 1);
        assert!(!tracked().contains(&pid));

        let status = tokio::time::timeout(std::time::Duration::from_secs(5), child.wait())
            .await
            .unwrap()
            .unwrap();
        assert!(!status.success());
    }
}
