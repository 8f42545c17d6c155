//! Output-directory layout (§6, §4.8): `out-N/` for the smallest non-negative
//! `N` whose creation succeeds, with `klee-out/` created first so the watch
//! can be installed before the executor ever runs.

use pd_common::{PatchError, PatchResult};
use std::path::{Path, PathBuf};

pub struct CampaignDir {
    pub root: PathBuf,
    pub klee_out: PathBuf,
}

pub fn create(parent: &Path) -> PatchResult<CampaignDir> {
    for n in 0.. {
        let root = parent.join(format!("out-{n}"));
        match std::fs::create_dir(&root) {
            Ok(()) => {
                let klee_out = root.join("klee-out");
                std::fs::create_dir(&klee_out).map_err(|e| {
                    PatchError::filesystem(format!("failed to create {}: {e}", klee_out.display()))
                })?;
                return Ok(CampaignDir { root, klee_out });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(PatchError::filesystem(format!(
                    "failed to create {}: {e}",
                    root.display()
                )))
            }
        }
    }
    unreachable!("0.. never terminates before returning or erroring")
}
