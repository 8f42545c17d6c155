//! Resolves CLI input and environment into the configuration the
//! supervisor needs to launch the executor (§6, §7 category 1).

use pd_common::{PatchError, PatchResult};
use pd_supervisor::SupervisorConfig;
use std::env;
use std::path::PathBuf;

/// Names the executor's installation directory (§6: "one required variable
/// names the executor's installation directory").
pub const EXECUTOR_DIR_VAR: &str = "KLEE_PATH";

fn resolve_executor_dir() -> PatchResult<PathBuf> {
    env::var_os(EXECUTOR_DIR_VAR)
        .map(PathBuf::from)
        .ok_or_else(|| PatchError::config(format!("{EXECUTOR_DIR_VAR} is not set")))
}

pub fn resolve(libc: &str, dump_scratch_path: Option<PathBuf>) -> PatchResult<SupervisorConfig> {
    let dir = resolve_executor_dir()?;
    let executor = dir.join("klee");
    if !executor.exists() {
        return Err(PatchError::config(format!(
            "executor not found at {} ({EXECUTOR_DIR_VAR} may be wrong)",
            executor.display()
        )));
    }
    let dump_scratch_path = dump_scratch_path.unwrap_or_else(default_dump_scratch_path);
    Ok(SupervisorConfig::new(executor, libc, dump_scratch_path))
}

fn default_dump_scratch_path() -> PathBuf {
    PathBuf::from("/tmp/klee-compare-dump")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_var_is_a_config_error() {
        env::remove_var(EXECUTOR_DIR_VAR);
        let err = resolve_executor_dir().unwrap_err();
        assert!(matches!(err, PatchError::Config { .. }));
    }
}
