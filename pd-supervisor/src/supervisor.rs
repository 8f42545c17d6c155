//! Supervisor (C8): creates the campaign output directory, installs the
//! priority map, launches the executor, starts the watcher and replay
//! driver, and tears everything down once the executor exits.

use crate::config::SupervisorConfig;
use crate::{invoke, outdir, priorities};
use pd_common::{PatchError, PatchResult};
use pd_ir::Module;
use pd_replay::ReplayConfig;
use pd_watch::KtestQueue;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one full campaign: the executor's exit status plus the
/// replay driver's tally.
pub struct CampaignReport {
    pub output_dir: std::path::PathBuf,
    pub executor_success: bool,
    pub paths_compared: u64,
    pub paths_differing: u64,
}

/// Run one end-to-end campaign comparing `patched` against `original`.
/// `patched_bitcode`/`original_bitcode` are the paths forwarded to the
/// executor; `patched_ir`/`original_ir` are the already-loaded modules the
/// static analyzer consumes.
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &SupervisorConfig,
    campaign_parent: &Path,
    patched_ir: &Module,
    original_ir: &Module,
    patched_bitcode: &Path,
    original_bitcode: &Path,
    program_args: &[String],
) -> PatchResult<CampaignReport> {
    let campaign = outdir::create(campaign_parent)?;

    let heuristic = pd_priority::analyze(patched_ir, original_ir)?;
    priorities::install(&heuristic, &campaign.root.join("priorities.json"))?;

    let queue = KtestQueue::new();
    let (watch_stop, watch_handle) = pd_watch::spawn(&campaign.klee_out, queue.clone());
    let done = Arc::new(AtomicBool::new(false));

    let replay_config = ReplayConfig::new(
        config.executor.clone(),
        config.libc.clone(),
        config.dump_scratch_path.clone(),
        campaign.klee_out.clone(),
    );
    let replay_handle = {
        let queue = queue.clone();
        let done = Arc::clone(&done);
        let replay_config = replay_config.clone();
        let campaign_root = campaign.root.clone();
        let patched_bitcode = patched_bitcode.to_path_buf();
        let original_bitcode = original_bitcode.to_path_buf();
        std::thread::spawn(move || {
            pd_replay::run(&queue, &done, &replay_config, &patched_bitcode, &original_bitcode, &campaign_root)
        })
    };

    let status = invoke::run_primary(config, &campaign.root, patched_bitcode, original_bitcode, program_args)?;

    // Give the watcher a moment to observe any tests written right before
    // the executor exited, then signal both tasks to wind down.
    std::thread::sleep(Duration::from_millis(500));
    done.store(true, Ordering::Release);
    watch_stop.store(true, Ordering::Release);

    let stats = replay_handle
        .join()
        .map_err(|_| PatchError::replay("replay driver thread panicked"))??;
    watch_handle
        .join()
        .map_err(|_| PatchError::filesystem("watcher thread panicked"))??;

    Ok(CampaignReport {
        output_dir: campaign.root,
        executor_success: status.success(),
        paths_compared: stats.paths,
        paths_differing: stats.differences,
    })
}
