//! Builds and runs the replay-mode executor invocation from §6:
//! `<executor> --libc=… --posix-runtime --posix-compare --output-dir <dir>
//! --replay-ktest-file <test> <module>`.

use crate::config::ReplayConfig;
use pd_process::ProcessBuilder;
use std::path::Path;

/// Run one replay. Replay failures (crash, non-zero exit) are category-4
/// errors (§7): recoverable, isolated per test. The caller compares whatever
/// dump resulted, so a failed run is logged and swallowed rather than
/// propagated.
pub fn run_replay(config: &ReplayConfig, module: &Path, output_dir: &Path, ktest: &str) {
    let ktest_path = config.ktest_dir.join(ktest);
    let status = ProcessBuilder::new(config.executor.to_string_lossy().into_owned())
        .arg(format!("--libc={}", config.libc))
        .arg("--posix-runtime")
        .arg("--posix-compare")
        .arg("--output-dir")
        .arg(output_dir.to_string_lossy().into_owned())
        .arg("--replay-ktest-file")
        .arg(ktest_path.to_string_lossy().into_owned())
        .arg(module.to_string_lossy().into_owned())
        .run();

    match status {
        Ok(status) if status.success() => {}
        Ok(status) => log::warn!(
            "replay of {ktest} on {} exited with {:?}, comparing dump as-is",
            module.display(),
            status.code()
        ),
        Err(e) => log::warn!(
            "replay of {ktest} on {} failed to run: {e}, comparing dump as-is",
            module.display()
        ),
    }
}
