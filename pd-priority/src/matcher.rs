//! Block Matcher (§4.3): finds, for each basic block in the patched module,
//! an equivalent basic block in the original module with matching
//! control-flow successors, and assigns every patched block a weight in
//! {0, 1}.

use crate::equiv::{equiv, EquivMemo};
use crate::key::FuncBlock;
use pd_common::PatchResult;
use pd_ir::{BasicBlock, BlockId, Function, Module};
use std::collections::HashMap;

/// Per-block weight: 0 if matched against an equivalent original block with
/// matching control flow, 1 if changed or new.
#[derive(Debug, Clone, Default)]
pub struct Weights(HashMap<FuncBlock, u8>);

impl Weights {
    pub fn get(&self, function: &str, block: BlockId) -> u8 {
        self.0.get(&FuncBlock::new(function, block)).copied().unwrap_or(1)
    }

    pub(crate) fn set_mut(&mut self, function: &str, block: BlockId, weight: u8) {
        self.0.insert(FuncBlock::new(function, block), weight);
    }
}

/// Compute the weight map for every block of every function in `patched`.
pub fn match_blocks(patched: &Module, original: &Module) -> PatchResult<Weights> {
    let mut weights = Weights::default();

    for func in patched.functions() {
        let Some(orig_func) = original.function(&func.name) else {
            for b in func.blocks() {
                weights.set_mut(&func.name, b.id, 1);
            }
            continue;
        };

        // EQ(B): every original block whose instruction stream matches B's.
        let mut eq: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for b in func.blocks() {
            let mut candidates = Vec::new();
            for b0 in orig_func.blocks() {
                let mut memo = EquivMemo::new();
                if blocks_match(b, func, b0, orig_func, &mut memo)? {
                    candidates.push(b0.id);
                }
            }
            eq.insert(b.id, candidates);
        }

        for b in func.blocks() {
            let tentative = if eq[&b.id].is_empty() { 1 } else { 0 };
            weights.set_mut(&func.name, b.id, tentative);
        }

        // Control-flow refinement: require at least one twin whose successor
        // sequence also lines up, element for element, inside EQ.
        for b in func.blocks() {
            if eq[&b.id].is_empty() {
                continue;
            }
            let has_cf_twin = eq[&b.id].iter().any(|&b0_id| {
                let b0 = match orig_func.block(b0_id) {
                    Some(b0) => b0,
                    None => return false,
                };
                successors_line_up(b, b0, &eq)
            });
            if !has_cf_twin {
                weights.set_mut(&func.name, b.id, 1);
            }
        }
    }

    Ok(weights)
}

fn successors_line_up(
    b: &BasicBlock,
    b0: &BasicBlock,
    eq: &HashMap<BlockId, Vec<BlockId>>,
) -> bool {
    if b.successors.len() != b0.successors.len() {
        return false;
    }
    b.successors
        .iter()
        .zip(b0.successors.iter())
        .all(|(s, s0)| eq.get(s).map_or(false, |candidates| candidates.contains(s0)))
}

/// Walk both non-debug instruction streams of `b` and `b0` in lockstep.
/// Terminators are accepted without recursing through `equiv` — the
/// successor check in the caller handles control flow. Everything else must
/// be pairwise equivalent, and the streams must be the same length.
fn blocks_match(
    b: &BasicBlock,
    func: &Function,
    b0: &BasicBlock,
    func0: &Function,
    memo: &mut EquivMemo,
) -> PatchResult<bool> {
    let a_stream: Vec<_> = b.instructions(false).collect();
    let b_stream: Vec<_> = b0.instructions(false).collect();
    if a_stream.len() != b_stream.len() {
        return Ok(false);
    }
    for (ia, ib) in a_stream.iter().zip(b_stream.iter()) {
        if ia.is_terminator != ib.is_terminator {
            return Ok(false);
        }
        if ia.is_terminator {
            continue;
        }
        if !equiv(ia, func, ib, func0, memo)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_ir::{Instruction, InstId};
    use std::collections::HashMap as Map;

    fn inst(id: u32, text: &str, terminator: bool) -> Instruction {
        Instruction {
            id: InstId(id),
            opcode: "x".to_string(),
            operands: vec![],
            text: text.to_string(),
            is_debug: false,
            is_terminator: terminator,
            is_branch: terminator,
            call: None,
        }
    }

    fn single_block_func(name: &str, body_text: &str) -> Function {
        Function {
            name: name.to_string(),
            params: vec![],
            is_variadic: false,
            is_intrinsic: false,
            entry: BlockId(0),
            blocks: vec![BasicBlock {
                id: BlockId(0),
                label: "entry".to_string(),
                instructions: vec![inst(0, body_text, false), inst(1, "ret void", true)],
                successors: vec![],
            }],
        }
    }

    #[test]
    fn identical_function_matches_with_zero_weight() {
        let f = single_block_func("f", "%1 = add i32 1, 1");
        let patched = Module { name: "p".to_string(), functions: vec![f.clone()], aliases: Map::new() };
        let original = Module { name: "o".to_string(), functions: vec![f], aliases: Map::new() };
        let weights = match_blocks(&patched, &original).unwrap();
        assert_eq!(weights.get("f", BlockId(0)), 0);
    }

    #[test]
    fn changed_body_gets_weight_one() {
        let patched_f = single_block_func("f", "%1 = add i32 1, 1");
        let original_f = single_block_func("f", "%1 = mul i32 1, 1");
        let patched = Module { name: "p".to_string(), functions: vec![patched_f], aliases: Map::new() };
        let original = Module { name: "o".to_string(), functions: vec![original_f], aliases: Map::new() };
        let weights = match_blocks(&patched, &original).unwrap();
        assert_eq!(weights.get("f", BlockId(0)), 1);
    }

    #[test]
    fn missing_function_in_original_is_all_weight_one() {
        let f = single_block_func("new_func", "%1 = add i32 1, 1");
        let patched = Module { name: "p".to_string(), functions: vec![f], aliases: Map::new() };
        let original = Module { name: "o".to_string(), functions: vec![], aliases: Map::new() };
        let weights = match_blocks(&patched, &original).unwrap();
        assert_eq!(weights.get("new_func", BlockId(0)), 1);
    }

    #[test]
    fn matched_text_but_diverging_successors_forces_weight_one() {
        // entry's own body matches textually (it only holds a terminator,
        // skipped by `blocks_match`), but the block it branches to has a
        // changed body and so has no twin in EQ — the refinement pass must
        // raise weight(entry) back to 1 even though entry itself looked matched.
        fn two_block_func(name: &str, target_body: &str) -> Function {
            Function {
                name: name.to_string(),
                params: vec![],
                is_variadic: false,
                is_intrinsic: false,
                entry: BlockId(0),
                blocks: vec![
                    BasicBlock {
                        id: BlockId(0),
                        label: "entry".to_string(),
                        instructions: vec![inst(0, "br label %x", true)],
                        successors: vec![BlockId(1)],
                    },
                    BasicBlock {
                        id: BlockId(1),
                        label: "x".to_string(),
                        instructions: vec![inst(2, target_body, false), inst(3, "ret void", true)],
                        successors: vec![],
                    },
                ],
            }
        }
        let patched_f = two_block_func("f", "%2 = add i32 2, 2");
        let original_f = two_block_func("f", "%2 = sub i32 2, 2");

        let patched = Module { name: "p".to_string(), functions: vec![patched_f], aliases: Map::new() };
        let original = Module { name: "o".to_string(), functions: vec![original_f], aliases: Map::new() };
        let weights = match_blocks(&patched, &original).unwrap();
        assert_eq!(weights.get("f", BlockId(1)), 1, "x's body changed");
        assert_eq!(weights.get("f", BlockId(0)), 1, "entry inherits via successor refinement");
    }
}
