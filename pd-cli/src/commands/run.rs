//! Run command: resolve configuration, load both modules, and hand off to
//! the supervisor for the full campaign.

use crate::{config, ir};
use anyhow::Context;
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    patched: PathBuf,
    patched_ir: PathBuf,
    original: PathBuf,
    original_ir: PathBuf,
    libc: String,
    output_root: PathBuf,
    dump_scratch_path: Option<PathBuf>,
    program_args: Vec<String>,
) -> anyhow::Result<()> {
    let supervisor_config =
        config::resolve(&libc, dump_scratch_path).context("failed to resolve executor configuration")?;
    let patched_module = ir::load_module(&patched_ir).context("failed to load patched IR")?;
    let original_module = ir::load_module(&original_ir).context("failed to load original IR")?;

    let report = pd_supervisor::run(
        &supervisor_config,
        &output_root,
        &patched_module,
        &original_module,
        &patched,
        &original,
        &program_args,
    )
    .map_err(|e| {
        if e.is_fatal_bug() {
            log::error!("internal analyzer bug, refusing to report a priority map built on it: {e}");
        }
        anyhow::anyhow!("{e}")
    })?;

    log::info!(
        "campaign finished in {}: {} paths compared, {} differing",
        report.output_dir.display(),
        report.paths_compared,
        report.paths_differing,
    );
    if !report.executor_success {
        log::warn!("executor exited non-zero");
    }
    println!("{}", report.output_dir.display());
    Ok(())
}
