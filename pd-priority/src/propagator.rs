//! Priority Propagator (§4.4): assigns every instruction a priority equal to
//! the maximum summed weight along any forward path to a function exit,
//! then boosts priorities across call sites to a module-wide fixed point.

use crate::key::FuncInst;
use crate::matcher::Weights;
use pd_common::PatchResult;
use pd_ir::{possible_callees, BasicBlock, BlockId, CalleeResolution, Dominators, Function, InstId, Module};
use std::collections::{HashMap, HashSet, VecDeque};

/// Priority per instruction, keyed by (function name, instruction id) since
/// `InstId`s repeat across functions.
#[derive(Debug, Clone, Default)]
pub struct Priorities(HashMap<FuncInst, u64>);

impl Priorities {
    pub fn get(&self, function: &str, inst: InstId) -> u64 {
        self.0.get(&FuncInst::new(function, inst)).copied().unwrap_or(0)
    }

    fn set(&mut self, function: &str, inst: InstId, value: u64) {
        self.0.insert(FuncInst::new(function, inst), value);
    }

    /// All non-default entries, for installing the map into the executor's
    /// search heuristic. Absent pairs read as priority 0 via `get`.
    pub fn iter(&self) -> impl Iterator<Item = (&FuncInst, &u64)> {
        self.0.iter()
    }
}

/// Run the full pipeline: call-weight coupling, then intra-procedural
/// back-propagation per function, then the inter-procedural boost to a
/// fixed point. `weights` is the block-weight map produced by the block
/// matcher against the patched module; it is widened in place by the
/// call-weight coupling pass (§4.4 "Priority-weight coupling").
pub fn compute_priorities(module: &Module, weights: &mut Weights) -> PatchResult<Priorities> {
    couple_call_weights(module, weights)?;

    let mut priorities = Priorities::default();
    for func in module.functions() {
        propagate_intraprocedural(func, weights, &mut priorities);
    }
    propagate_interprocedural(module, &mut priorities)?;
    Ok(priorities)
}

/// Raise a call's enclosing block to weight 1 if any instruction in any of
/// its possible callees lives in a non-zero-weight block. Runs to a fixed
/// point before priority propagation so that traversing a call into changed
/// code counts just like traversing into a changed block directly.
///
/// Checked at block granularity, not per-instruction: every later Phase 1
/// update rule keys off `weight(B)`, not an individual instruction's own
/// weight, so raising at block granularity is the only reading that keeps
/// this pass consistent with the rest of the propagator.
fn couple_call_weights(module: &Module, weights: &mut Weights) -> PatchResult<()> {
    loop {
        let mut changed = false;
        for func in module.functions() {
            for block in func.blocks() {
                if weights.get(&func.name, block.id) != 0 {
                    continue;
                }
                for inst in block.instructions(true) {
                    if !inst.is_call() {
                        continue;
                    }
                    let calls_into_changed_code = match possible_callees(module, inst)? {
                        CalleeResolution::InlineAsm => false,
                        CalleeResolution::Direct(callee) => callee_has_nonzero_block(callee, weights),
                        CalleeResolution::Indirect(callees) => {
                            callees.iter().any(|c| callee_has_nonzero_block(c, weights))
                        }
                    };
                    if calls_into_changed_code {
                        weights.set_mut(&func.name, block.id, 1);
                        changed = true;
                        break;
                    }
                }
            }
        }
        if !changed {
            return Ok(());
        }
    }
}

fn callee_has_nonzero_block(callee: &Function, weights: &Weights) -> bool {
    callee.blocks().any(|b| weights.get(&callee.name, b.id) != 0)
}

/// Exit blocks: those with no successors, discovered from the entry while
/// skipping back-edges — a successor `S` of `B` is only enqueued if `S`
/// does not dominate `B`, so a loop's back-edge never forces a revisit.
fn exit_blocks(func: &Function, doms: &Dominators) -> Vec<BlockId> {
    let mut visited = HashSet::new();
    let mut exits = Vec::new();
    let mut stack = vec![func.entry];
    visited.insert(func.entry);
    while let Some(b) = stack.pop() {
        let Some(bb) = func.block(b) else { continue };
        if bb.successors.is_empty() {
            exits.push(b);
            continue;
        }
        for &s in &bb.successors {
            if doms.dominates(s, b) {
                continue;
            }
            if visited.insert(s) {
                stack.push(s);
            }
        }
    }
    exits
}

/// Phase 1: back-propagate priorities within one function, ignoring calls.
fn propagate_intraprocedural(func: &Function, weights: &Weights, priorities: &mut Priorities) {
    let doms = Dominators::compute(func);
    let exits = exit_blocks(func, &doms);

    let mut last_seen: HashMap<BlockId, u64> = HashMap::new();
    let mut worklist: VecDeque<BlockId> = exits.into_iter().collect();
    let mut pending: HashSet<BlockId> = worklist.iter().copied().collect();

    while let Some(b_id) = worklist.pop_front() {
        pending.remove(&b_id);
        let Some(bb) = func.block(b_id) else { continue };
        let term = bb.terminator();
        let term_priority = priorities.get(&func.name, term.id);

        if last_seen.get(&b_id) == Some(&term_priority) {
            continue;
        }
        last_seen.insert(b_id, term_priority);

        let weight_b = weights.get(&func.name, b_id) as u64;
        let mut next = term_priority;
        for inst in bb.instructions[..bb.instructions.len() - 1].iter().rev() {
            let p = next + weight_b;
            priorities.set(&func.name, inst.id, p);
            next = p;
        }
        let entry_priority = priorities.get(&func.name, bb.instructions[0].id);

        for pred in func.predecessors(b_id) {
            let Some(pred_bb) = func.block(pred) else { continue };
            let pred_term = pred_bb.terminator();
            let candidate = weight_b + entry_priority;
            let current = priorities.get(&func.name, pred_term.id);
            if candidate > current {
                priorities.set(&func.name, pred_term.id, candidate);
            }
            if pending.insert(pred) {
                worklist.push_back(pred);
            }
        }
    }
}

/// The first instruction executed in the caller after `call` returns: the
/// next instruction for a direct call, or the first non-phi instruction of
/// the normal-destination block for an invoke-style call.
fn return_location(func: &Function, block: &BasicBlock, call: &pd_ir::Instruction) -> Option<InstId> {
    let site = call.call.as_ref()?;
    if let Some(dest) = site.normal_dest {
        let dest_block = func.block(dest)?;
        dest_block
            .instructions
            .iter()
            .find(|i| i.opcode != "phi")
            .map(|i| i.id)
    } else {
        let idx = block.instructions.iter().position(|i| i.id == call.id)?;
        block.instructions.get(idx + 1).map(|i| i.id)
    }
}

/// Phase 2: boost priorities across call sites to a module-wide fixed point.
/// Inline-assembly calls are skipped throughout.
fn propagate_interprocedural(module: &Module, priorities: &mut Priorities) -> PatchResult<()> {
    loop {
        let mut changed = false;
        for func in module.functions() {
            for block in func.blocks() {
                for inst in block.instructions(true) {
                    if !inst.is_call() {
                        continue;
                    }
                    let callees: Vec<&Function> = match possible_callees(module, inst)? {
                        CalleeResolution::InlineAsm => continue,
                        CalleeResolution::Direct(f) => vec![f],
                        CalleeResolution::Indirect(fs) => fs,
                    };
                    let Some(r_id) = return_location(func, block, inst) else {
                        continue;
                    };
                    let r_priority = priorities.get(&func.name, r_id);
                    if r_priority == 0 {
                        continue;
                    }
                    for callee in &callees {
                        for cb in callee.blocks() {
                            for ci in cb.instructions(true) {
                                if priorities.get(&callee.name, ci.id) == 0 {
                                    priorities.set(&callee.name, ci.id, r_priority);
                                    changed = true;
                                }
                            }
                        }
                    }
                }
            }
        }
        if !changed {
            return Ok(());
        }
    }
}
