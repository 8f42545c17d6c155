//! Per-function dominator trees, computed with the standard iterative
//! reverse-postorder algorithm (Cooper, Harvey & Kennedy, "A Simple, Fast
//! Dominance Algorithm").

use crate::module::{BlockId, Function};
use std::collections::HashMap;

/// The dominator tree of one function, keyed by immediate dominator.
#[derive(Debug, Clone)]
pub struct Dominators {
    entry: BlockId,
    idom: HashMap<BlockId, BlockId>,
}

impl Dominators {
    /// Compute the dominator tree of `func`. Unreachable blocks (not
    /// reachable from the entry via successor edges) have no entry in the
    /// tree and `dominates` treats them as dominating nothing.
    pub fn compute(func: &Function) -> Self {
        let order = reverse_postorder(func);
        let rpo_index: HashMap<BlockId, usize> =
            order.iter().enumerate().map(|(i, b)| (*b, i)).collect();
        let preds: HashMap<BlockId, Vec<BlockId>> = order
            .iter()
            .map(|&b| (b, func.predecessors(b)))
            .collect();

        let entry = func.entry;
        let mut idom: HashMap<BlockId, BlockId> = HashMap::new();
        idom.insert(entry, entry);

        let mut changed = true;
        while changed {
            changed = false;
            for &b in order.iter().skip(1) {
                let candidates: Vec<BlockId> = preds
                    .get(&b)
                    .into_iter()
                    .flatten()
                    .copied()
                    .filter(|p| idom.contains_key(p))
                    .collect();
                let Some(&first) = candidates.first() else {
                    continue;
                };
                let mut new_idom = first;
                for &p in &candidates[1..] {
                    new_idom = intersect(&idom, &rpo_index, new_idom, p);
                }
                match idom.get(&b) {
                    Some(&cur) if cur == new_idom => {}
                    _ => {
                        idom.insert(b, new_idom);
                        changed = true;
                    }
                }
            }
        }

        Self { entry, idom }
    }

    /// True iff `a` dominates `b` (every path from entry to `b` passes
    /// through `a`). A block dominates itself. Unreachable blocks dominate
    /// nothing and are dominated by nothing.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        if !self.idom.contains_key(&b) {
            return false;
        }
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            if cur == self.entry {
                return cur == a;
            }
            match self.idom.get(&cur) {
                Some(&next) if next != cur => cur = next,
                _ => return cur == a,
            }
        }
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }
}

fn intersect(
    idom: &HashMap<BlockId, BlockId>,
    rpo_index: &HashMap<BlockId, usize>,
    mut a: BlockId,
    mut b: BlockId,
) -> BlockId {
    while a != b {
        while rpo_index[&a] > rpo_index[&b] {
            a = idom[&a];
        }
        while rpo_index[&b] > rpo_index[&a] {
            b = idom[&b];
        }
    }
    a
}

fn reverse_postorder(func: &Function) -> Vec<BlockId> {
    let mut visited = std::collections::HashSet::new();
    let mut postorder = Vec::new();
    let mut stack = vec![(func.entry, false)];
    while let Some((block, expanded)) = stack.pop() {
        if expanded {
            postorder.push(block);
            continue;
        }
        if !visited.insert(block) {
            continue;
        }
        stack.push((block, true));
        if let Some(bb) = func.block(block) {
            for &succ in bb.successors.iter().rev() {
                if !visited.contains(&succ) {
                    stack.push((succ, false));
                }
            }
        }
    }
    postorder.reverse();
    postorder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{BasicBlock, Instruction};

    fn term(id: u32) -> Instruction {
        Instruction {
            id: crate::module::InstId(id),
            opcode: "br".to_string(),
            operands: vec![],
            text: "br".to_string(),
            is_debug: false,
            is_terminator: true,
            is_branch: true,
            call: None,
        }
    }

    fn block(n: u32, successors: &[u32]) -> BasicBlock {
        BasicBlock {
            id: BlockId(n),
            label: format!("bb{n}"),
            instructions: vec![term(n * 10)],
            successors: successors.iter().map(|&s| BlockId(s)).collect(),
        }
    }

    fn diamond() -> Function {
        Function {
            name: "f".to_string(),
            params: vec![],
            is_variadic: false,
            is_intrinsic: false,
            entry: BlockId(0),
            blocks: vec![
                block(0, &[1, 2]),
                block(1, &[3]),
                block(2, &[3]),
                block(3, &[]),
            ],
        }
    }

    #[test]
    fn entry_dominates_everything() {
        let f = diamond();
        let doms = Dominators::compute(&f);
        for b in [0, 1, 2, 3] {
            assert!(doms.dominates(BlockId(0), BlockId(b)));
        }
    }

    #[test]
    fn diamond_join_not_dominated_by_either_branch() {
        let f = diamond();
        let doms = Dominators::compute(&f);
        assert!(!doms.dominates(BlockId(1), BlockId(3)));
        assert!(!doms.dominates(BlockId(2), BlockId(3)));
        assert!(doms.dominates(BlockId(0), BlockId(3)));
    }

    #[test]
    fn loop_back_edge_does_not_dominate_header() {
        let f = Function {
            name: "loop".to_string(),
            params: vec![],
            is_variadic: false,
            is_intrinsic: false,
            entry: BlockId(0),
            blocks: vec![
                block(0, &[1]),
                block(1, &[2, 1]),
                block(2, &[]),
            ],
        };
        let doms = Dominators::compute(&f);
        assert!(doms.dominates(BlockId(1), BlockId(1)));
        assert!(!doms.dominates(BlockId(1), BlockId(0)));
        assert!(doms.dominates(BlockId(1), BlockId(2)));
    }
}
