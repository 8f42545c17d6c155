//! Search Heuristic Interface (§4.5): the only handle the executor's state
//! scheduler needs. It picks for expansion the symbolic state whose next
//! instruction has maximum priority, ties broken arbitrarily by the
//! scheduler itself — this crate only answers the lookup.

use crate::key::FuncInst;
use crate::propagator::Priorities;
use pd_ir::InstId;

/// Read-only view over a computed priority map, addressed the way the
/// executor addresses instructions: by owning function and instruction id.
pub struct SearchHeuristic {
    priorities: Priorities,
}

impl SearchHeuristic {
    pub fn new(priorities: Priorities) -> Self {
        Self { priorities }
    }

    /// Priority of `inst` in `function`, or 0 if absent from the map —
    /// absence means "never touched by propagation", which is itself a
    /// priority-0 instruction.
    pub fn priority(&self, function: &str, inst: InstId) -> u64 {
        self.priorities.get(function, inst)
    }

    /// Every instruction the propagator touched, for installing the map
    /// where the executor's search heuristic can read it.
    pub fn entries(&self) -> impl Iterator<Item = (&FuncInst, &u64)> {
        self.priorities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_instruction_reads_as_zero() {
        let heuristic = SearchHeuristic::new(Priorities::default());
        assert_eq!(heuristic.priority("anything", InstId(42)), 0);
    }
}
