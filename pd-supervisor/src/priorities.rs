//! Installs the priority map where the executor's custom search heuristic
//! (C5, an external collaborator) can read it: a flat JSON sidecar next to
//! the campaign output, keyed by function name and instruction id.

use pd_common::{PatchError, PatchResult};
use pd_priority::SearchHeuristic;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Entry {
    function: String,
    inst: u32,
    priority: u64,
}

pub fn install(heuristic: &SearchHeuristic, dest: &Path) -> PatchResult<()> {
    let entries: Vec<Entry> = heuristic
        .entries()
        .map(|(key, &priority)| Entry {
            function: key.0.clone(),
            inst: key.1 .0,
            priority,
        })
        .collect();
    let json = serde_json::to_vec_pretty(&entries)
        .map_err(|e| PatchError::filesystem(format!("failed to encode priorities: {e}")))?;
    std::fs::write(dest, json)
        .map_err(|e| PatchError::filesystem(format!("failed to write {}: {e}", dest.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_ir::{BasicBlock, BlockId, Function, InstId, Instruction, Module};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn ret(id: u32) -> Instruction {
        Instruction {
            id: InstId(id),
            opcode: "ret".to_string(),
            operands: vec![],
            text: "ret void".to_string(),
            is_debug: false,
            is_terminator: true,
            is_branch: false,
            call: None,
        }
    }

    #[test]
    fn writes_a_json_array() {
        let func = Function {
            name: "f".to_string(),
            params: vec![],
            is_variadic: false,
            is_intrinsic: false,
            entry: BlockId(0),
            blocks: vec![BasicBlock {
                id: BlockId(0),
                label: "entry".to_string(),
                instructions: vec![ret(0)],
                successors: vec![],
            }],
        };
        let patched = Module { name: "p".to_string(), functions: vec![func.clone()], aliases: HashMap::new() };
        let original = Module { name: "o".to_string(), functions: vec![func], aliases: HashMap::new() };
        let heuristic = pd_priority::analyze(&patched, &original).unwrap();

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("priorities.json");
        install(&heuristic, &dest).unwrap();
        let contents = std::fs::read_to_string(&dest).unwrap();
        assert!(contents.trim_start().starts_with('['));
    }
}
