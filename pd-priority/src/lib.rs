//! The patch-priority analyzer: instruction equivalence, block matching,
//! and priority propagation (§4.2–§4.5). This is the core of the
//! patch-directed differential symbolic execution harness — the static
//! side that decides which instructions the executor should prioritize.

pub mod equiv;
pub mod heuristic;
pub mod key;
pub mod matcher;
pub mod propagator;

pub use equiv::{equiv, EquivMemo};
pub use heuristic::SearchHeuristic;
pub use matcher::{match_blocks, Weights};
pub use propagator::{compute_priorities, Priorities};

use pd_common::PatchResult;
use pd_ir::Module;

/// Run the full static analysis: match blocks against the original module,
/// then propagate priorities. Returns the heuristic the executor installs
/// before launching on the patched module.
pub fn analyze(patched: &Module, original: &Module) -> PatchResult<SearchHeuristic> {
    let mut weights = match_blocks(patched, original)?;
    let priorities = compute_priorities(patched, &mut weights)?;
    Ok(SearchHeuristic::new(priorities))
}
