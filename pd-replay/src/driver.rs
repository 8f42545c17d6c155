//! Differential Replay Driver (§4.7): the consumer side of the ktest queue.
//! For each test, replay on both modules, compare dumps, and append one
//! line to the results log. Runs until the supervisor signals `done` and the
//! queue has been fully drained.

use crate::config::ReplayConfig;
use crate::dump::{collect_dump, dumps_differ};
use crate::invoke::run_replay;
use pd_common::{PatchError, PatchResult};
use pd_watch::KtestQueue;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub paths: u64,
    pub differences: u64,
}

/// Run the driver loop to completion. `out_dir` is the campaign's top-level
/// output directory (`out-N/`); `results.txt` is appended there.
pub fn run(
    queue: &KtestQueue,
    done: &AtomicBool,
    config: &ReplayConfig,
    patched_module: &Path,
    original_module: &Path,
    out_dir: &Path,
) -> PatchResult<ReplayStats> {
    let results_path = out_dir.join("results.txt");
    let mut results = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&results_path)
        .map_err(|e| PatchError::filesystem(format!("failed to open {}: {e}", results_path.display())))?;

    let mut stats = ReplayStats::default();

    loop {
        match queue.pop() {
            Some(test) => replay_one(&test, config, patched_module, original_module, out_dir, &mut results, &mut stats)?,
            None if done.load(Ordering::Acquire) => break,
            None => std::thread::sleep(POLL_INTERVAL),
        }
    }
    // The supervisor may set `done` while a test is still mid-flight in the
    // queue (it sleeps briefly first, but that's best-effort); drain fully
    // before writing the summary so no result line is lost.
    while let Some(test) = queue.pop() {
        replay_one(&test, config, patched_module, original_module, out_dir, &mut results, &mut stats)?;
    }

    writeln!(results, "paths compared = {}", stats.paths)
        .map_err(|e| PatchError::filesystem(format!("failed to write summary: {e}")))?;
    writeln!(results, "paths differing = {}", stats.differences)
        .map_err(|e| PatchError::filesystem(format!("failed to write summary: {e}")))?;

    Ok(stats)
}

fn replay_one(
    test: &str,
    config: &ReplayConfig,
    patched_module: &Path,
    original_module: &Path,
    out_dir: &Path,
    results: &mut std::fs::File,
    stats: &mut ReplayStats,
) -> PatchResult<()> {
    let patched_dir = out_dir.join("PATCHED");
    let original_dir = out_dir.join("ORIGINAL");
    std::fs::create_dir_all(&patched_dir)
        .map_err(|e| PatchError::filesystem(format!("failed to create {}: {e}", patched_dir.display())))?;
    std::fs::create_dir_all(&original_dir)
        .map_err(|e| PatchError::filesystem(format!("failed to create {}: {e}", original_dir.display())))?;

    run_replay(config, patched_module, &patched_dir, test);
    let patched_dump = collect_dump(&config.dump_scratch_path, &patched_dir)?;

    run_replay(config, original_module, &original_dir, test);
    let original_dump = collect_dump(&config.dump_scratch_path, &original_dir)?;

    let differ = dumps_differ(&patched_dump, &original_dump)?;
    let verdict = if differ { "DIFFER" } else { "MATCH" };
    writeln!(results, "Outputs {verdict} on test {}", ktest_index(test))
        .map_err(|e| PatchError::filesystem(format!("failed to append result: {e}")))?;

    stats.paths += 1;
    if differ {
        stats.differences += 1;
    }

    let _ = std::fs::remove_dir_all(&patched_dir);
    let _ = std::fs::remove_dir_all(&original_dir);
    Ok(())
}

/// `testNNNNNN.ktest` -> `NNNNNN` parsed as an unsigned integer, falling back
/// to the raw name if it is not in the expected shape (defensive; the queue
/// should only ever contain names the watcher already validated).
fn ktest_index(name: &str) -> String {
    name.strip_prefix("test")
        .and_then(|rest| rest.strip_suffix(".ktest"))
        .and_then(|digits| digits.parse::<u64>().ok())
        .map(|n| n.to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ktest_index_strips_leading_zeros() {
        assert_eq!(ktest_index("test000006.ktest"), "6");
        assert_eq!(ktest_index("test123456.ktest"), "123456");
    }

    #[test]
    fn ktest_index_falls_back_on_malformed_name() {
        assert_eq!(ktest_index("weird"), "weird");
    }

    #[test]
    fn drains_queue_and_writes_summary_when_done() {
        let dir = tempfile::TempDir::new().unwrap();
        let queue = KtestQueue::new();
        queue.push("test000001.ktest".to_string());
        queue.push("test000002.ktest".to_string());
        let done = AtomicBool::new(true);

        let config = ReplayConfig::new(
            std::path::PathBuf::from("/bin/true"),
            "klee",
            dir.path().join("scratch-dump"),
            dir.path().join("klee-out"),
        );
        let stats = run(
            &queue,
            &done,
            &config,
            &dir.path().join("patched.bc"),
            &dir.path().join("original.bc"),
            dir.path(),
        )
        .unwrap();

        assert_eq!(stats.paths, 2);
        let results = std::fs::read_to_string(dir.path().join("results.txt")).unwrap();
        assert!(results.contains("Outputs MATCH on test 1"));
        assert!(results.contains("Outputs MATCH on test 2"));
        assert!(results.contains("paths compared = 2"));
        assert!(results.contains("paths differing = 0"));
    }
}
