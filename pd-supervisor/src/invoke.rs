//! Builds the primary executor invocation from §6:
//! `<executor> --libc=… --posix-runtime --output-dir klee-out --search
//! patch-priority --compare-bitcode <ORIGINAL> <args…> <PATCHED>`.

use crate::config::SupervisorConfig;
use pd_common::{PatchError, PatchResult};
use pd_process::{ExitStatus, ProcessBuilder};
use std::fs::File;
use std::path::Path;
use std::process::Stdio;

/// Launch the primary executor and block until it exits. stdout/stderr are
/// both redirected into `klee_out.txt` (matching the reference CLI's
/// stdout/stderr redirection) and the working directory is `campaign_root`
/// so the relative `klee-out` output-dir argument resolves inside it.
pub fn run_primary(
    config: &SupervisorConfig,
    campaign_root: &Path,
    patched_bitcode: &Path,
    original_bitcode: &Path,
    program_args: &[String],
) -> PatchResult<ExitStatus> {
    let log_path = campaign_root.join("klee_out.txt");
    let log_file = File::create(&log_path)
        .map_err(|e| PatchError::filesystem(format!("failed to create {}: {e}", log_path.display())))?;
    let log_file_err = log_file
        .try_clone()
        .map_err(|e| PatchError::filesystem(format!("failed to duplicate log handle: {e}")))?;

    let mut builder = ProcessBuilder::new(config.executor.to_string_lossy().into_owned())
        .arg(format!("--libc={}", config.libc))
        .arg("--posix-runtime")
        .arg("--output-dir")
        .arg("klee-out")
        .arg("--search")
        .arg("patch-priority")
        .arg("--compare-bitcode")
        .arg(original_bitcode.to_string_lossy().into_owned())
        .current_dir(campaign_root.to_string_lossy().into_owned())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_file_err));

    for arg in program_args {
        builder = builder.arg(arg.clone());
    }
    builder = builder.arg(patched_bitcode.to_string_lossy().into_owned());

    builder.run()
}
