//! `BlockId` and `InstId` are only unique within their owning function, so
//! every cross-function map in this crate keys on the pair.

use pd_ir::{BlockId, InstId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncBlock(pub String, pub BlockId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncInst(pub String, pub InstId);

impl FuncBlock {
    pub fn new(function: impl Into<String>, block: BlockId) -> Self {
        Self(function.into(), block)
    }
}

impl FuncInst {
    pub fn new(function: impl Into<String>, inst: InstId) -> Self {
        Self(function.into(), inst)
    }
}
