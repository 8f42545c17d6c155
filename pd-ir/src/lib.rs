//! A thin, read-only accessor over an already-loaded IR module.
//!
//! This crate defines the shape the rest of the workspace expects from a
//! loaded module: functions, basic blocks in source order, instructions
//! with a canonical textual rendering, dominator trees, and call-target
//! resolution. Producing that module (parsing bitcode) and everything the
//! symbolic executor does with it are external collaborators and out of
//! scope here.

pub mod accessor;
pub mod dominators;
pub mod module;

pub use accessor::{possible_callees, CalleeResolution};
pub use dominators::Dominators;
pub use module::{
    BasicBlock, BlockId, CallSite, Callee, Function, InstId, Instruction, Module, Operand, Param,
};
