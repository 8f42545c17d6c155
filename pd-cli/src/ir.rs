//! Loads the already-parsed IR module the static analyzer consumes (§4.1).
//! Actually parsing bitcode is an external collaborator's job (§1
//! Non-goals); this tool takes a JSON dump of the loaded module produced
//! upstream of it.

use pd_common::{PatchError, PatchResult};
use pd_ir::Module;
use std::path::Path;

pub fn load_module(path: &Path) -> PatchResult<Module> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PatchError::config(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| {
        PatchError::config(format!(
            "failed to parse {} as a loaded IR module: {e}",
            path.display()
        ))
    })
}
