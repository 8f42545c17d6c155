//! Test-File Watcher (§4.6). Single-threaded, long-lived: observes the
//! executor's output directory and enqueues the name of every file whose
//! shape matches a ktest (`testNNNNNN.ktest`, sixteen bytes total). Installed
//! before the executor starts so no test creation can be missed.

use crate::queue::KtestQueue;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pd_common::{PatchError, PatchResult};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// How often the watch loop checks the cooperative stop flag between events.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// True if `name` has the executor's ktest naming shape: `test` followed by
/// six ASCII digits and `.ktest`, sixteen bytes total.
pub fn is_ktest_filename(name: &str) -> bool {
    name.len() == 16
        && name.starts_with("test")
        && name.ends_with(".ktest")
        && name.as_bytes()[4..10].iter().all(u8::is_ascii_digit)
}

/// Block until `stop` is set, enqueueing every ktest creation seen under
/// `dir` onto `queue`. Cancellation is cooperative: the blocking receive
/// times out on its own cadence so the stop flag gets checked even with no
/// filesystem activity, which stands in for "a blocking read interrupted by
/// a signal from the supervisor" without needing real signal delivery.
pub fn watch(dir: &Path, queue: &KtestQueue, stop: &AtomicBool) -> PatchResult<()> {
    let (tx, rx) = channel();
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(tx)
        .map_err(|e| PatchError::filesystem(format!("failed to create watcher: {e}")))?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| PatchError::filesystem(format!("failed to watch {}: {e}", dir.display())))?;

    loop {
        if stop.load(Ordering::Acquire) {
            return Ok(());
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => handle_event(&event, queue),
            Ok(Err(e)) => log::warn!("watch error on {}: {e}", dir.display()),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}

fn handle_event(event: &Event, queue: &KtestQueue) {
    if !matches!(event.kind, EventKind::Create(_)) {
        return;
    }
    for path in &event.paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_ktest_filename(name) {
            log::debug!("ktest {name} observed");
            queue.push(name.to_string());
        }
    }
}

/// Spawn the watcher on its own thread, returning a handle to request
/// cooperative shutdown via the returned stop flag plus the join handle.
pub fn spawn(dir: &Path, queue: KtestQueue) -> (Arc<AtomicBool>, std::thread::JoinHandle<PatchResult<()>>) {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_handle = Arc::clone(&stop);
    let dir = dir.to_path_buf();
    let handle = std::thread::spawn(move || watch(&dir, &queue, &stop_handle));
    (stop, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn recognizes_well_formed_ktest_names() {
        assert!(is_ktest_filename("test000006.ktest"));
        assert!(is_ktest_filename("test123456.ktest"));
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(!is_ktest_filename("test6.ktest"));
        assert!(!is_ktest_filename("test000006.kTest"));
        assert!(!is_ktest_filename("prog000006.ktest"));
        assert!(!is_ktest_filename("test00000a.ktest"));
        assert!(!is_ktest_filename("test0000006.ktest"));
    }

    #[test]
    fn enqueues_ktest_files_created_after_install() {
        let dir = TempDir::new().unwrap();
        let queue = KtestQueue::new();
        let (stop, handle) = spawn(dir.path(), queue.clone());

        std::thread::sleep(Duration::from_millis(100));
        std::fs::write(dir.path().join("test000001.ktest"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let mut seen = Vec::new();
        for _ in 0..50 {
            std::thread::sleep(Duration::from_millis(50));
            seen.extend(queue.drain());
            if !seen.is_empty() {
                break;
            }
        }
        stop.store(true, Ordering::Release);
        handle.join().unwrap().unwrap();

        assert_eq!(seen, vec!["test000001.ktest".to_string()]);
    }
}
