//! The data model for an already-loaded IR module.
//!
//! This is deliberately not a faithful LLVM IR: the bitcode loader and the
//! symbolic executor are external collaborators. What lives here is the
//! shape the analyzer needs from a loaded module —
//! functions, basic blocks in source order, instructions with a rendered
//! textual form and an operand list — regardless of which loader produced it.

use serde::{Deserialize, Serialize};

/// Identifies a basic block within its owning function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Identifies an instruction within its owning function. Unique per function,
/// not globally — two different functions may reuse the same `InstId` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstId(pub u32);

/// One operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// A literal constant; already folded into the instruction's text.
    Constant(String),
    /// A value produced by another instruction in the same function.
    Value(InstId),
    /// A function argument.
    Argument(String),
    /// A global variable or function reference.
    Global(String),
}

/// How a call instruction names its callee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Callee {
    /// Calls a function by name directly.
    Direct(String),
    /// Calls through a global alias; the alias table resolves the aliasee.
    Alias(String),
    /// Calls through a value (function pointer); resolved by argument-type matching.
    Indirect,
}

/// The call-specific data attached to a call or invoke instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub callee: Callee,
    /// Static types of the arguments at this call site, in order.
    pub arg_types: Vec<String>,
    /// For invoke-style calls: the normal-destination block reached on return.
    /// `None` means a plain call, whose return location is the next instruction.
    pub normal_dest: Option<BlockId>,
    pub is_inline_asm: bool,
}

/// A single IR instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub id: InstId,
    pub opcode: String,
    pub operands: Vec<Operand>,
    /// Canonical textual rendering, used by the equivalence check.
    pub text: String,
    pub is_debug: bool,
    pub is_terminator: bool,
    pub is_branch: bool,
    pub call: Option<CallSite>,
}

impl Instruction {
    pub fn is_call(&self) -> bool {
        self.call.is_some()
    }
}

/// A basic block: an ordered, straight-line instruction sequence ending in a terminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub label: String,
    /// Source order; the last element is always the terminator.
    pub instructions: Vec<Instruction>,
    pub successors: Vec<BlockId>,
}

impl BasicBlock {
    pub fn terminator(&self) -> &Instruction {
        self.instructions
            .last()
            .expect("a basic block always has at least a terminator")
    }

    /// Instructions in source order, optionally filtering out debug-only instructions.
    pub fn instructions(&self, include_debug: bool) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .filter(move |inst| include_debug || !inst.is_debug)
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

/// A function: a finite set of basic blocks with one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub is_variadic: bool,
    pub is_intrinsic: bool,
    pub entry: BlockId,
    /// All blocks, in source order. `entry` names one of their ids.
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn entry_block(&self) -> &BasicBlock {
        self.block(self.entry)
            .expect("function entry block must be present")
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    /// Find the instruction defining `id`, searching every block. `InstId`s
    /// are unique within a function, not globally.
    pub fn instruction(&self, id: InstId) -> Option<&Instruction> {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .find(|i| i.id == id)
    }

    /// The block containing instruction `id`, if any.
    pub fn block_of(&self, id: InstId) -> Option<BlockId> {
        self.blocks
            .iter()
            .find(|b| b.instructions.iter().any(|i| i.id == id))
            .map(|b| b.id)
    }

    /// Predecessors of `id`, computed from every block's successor list.
    pub fn predecessors(&self, id: BlockId) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| b.successors.contains(&id))
            .map(|b| b.id)
            .collect()
    }

    /// Parameters are a prefix-compatible match for `arg_types` when every
    /// fixed parameter's static type equals the corresponding argument type,
    /// and variadic callees accept at least as many arguments as parameters.
    pub fn accepts_arguments(&self, arg_types: &[String]) -> bool {
        if self.is_variadic {
            if arg_types.len() < self.params.len() {
                return false;
            }
        } else if arg_types.len() != self.params.len() {
            return false;
        }
        self.params
            .iter()
            .zip(arg_types.iter())
            .all(|(p, a)| &p.ty == a)
    }
}

/// An immutable, already-parsed module: a finite set of functions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
    /// Global alias name -> aliasee name. Chains are resolved by `resolve_alias`.
    pub aliases: std::collections::HashMap<String, String>,
}

impl Module {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    /// Chase an alias chain to its final aliasee name. Returns `None` if the
    /// name is not an alias at all (i.e. the caller should treat it as a
    /// direct reference instead).
    pub fn resolve_alias(&self, name: &str) -> Option<String> {
        let mut current = self.aliases.get(name)?.clone();
        let mut seen = std::collections::HashSet::new();
        seen.insert(name.to_string());
        while let Some(next) = self.aliases.get(&current) {
            if !seen.insert(current.clone()) {
                // Cyclic alias chain: give up at the last name seen.
                break;
            }
            current = next.clone();
        }
        Some(current)
    }
}
