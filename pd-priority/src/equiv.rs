//! Instruction equivalence modulo operand-name aliasing, debug metadata, and
//! struct-type numbering (§4.2).

use pd_common::{PatchError, PatchResult};
use pd_ir::{Function, InstId, Instruction, Operand};
use std::collections::HashMap;

/// Records positive equivalence outcomes only: a subsequent call with the
/// same patched instruction short-circuits to `true` if it previously
/// matched the same original instruction. Scoped to one function-pair match.
pub type EquivMemo = HashMap<InstId, InstId>;

/// Tokenize canonical instruction text by whitespace, the granularity the
/// tolerances operate on.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

fn tokens_tolerant_eq(a: &str, b: &str) -> bool {
    let mut ta = tokens(a);
    let mut tb = tokens(b);
    loop {
        match (ta.next(), tb.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if x == y {
                    continue;
                }
                if x.starts_with('!') && y.starts_with('!') {
                    continue;
                }
                if x.starts_with('%') && y.starts_with('%') {
                    continue;
                }
                if x.contains("struct") && y.contains("struct") {
                    continue;
                }
                return false;
            }
            _ => return false,
        }
    }
}

/// `equiv(a, b, memo)` — are `a` (in `func_a`) and `b` (in `func_b`) equivalent?
///
/// Branches must never be passed here; the block matcher handles them via
/// successor comparison instead.
pub fn equiv(
    a: &Instruction,
    func_a: &Function,
    b: &Instruction,
    func_b: &Function,
    memo: &mut EquivMemo,
) -> PatchResult<bool> {
    debug_assert!(!a.is_branch, "branches must be compared by successor, not equiv");
    debug_assert!(!b.is_branch, "branches must be compared by successor, not equiv");

    if let Some(&matched) = memo.get(&a.id) {
        return Ok(matched == b.id);
    }

    if !tokens_tolerant_eq(&a.text, &b.text) {
        return Ok(false);
    }

    if a.operands.len() != b.operands.len() {
        return Err(PatchError::ir_shape(format!(
            "instructions {:?} and {:?} have equal text but {} vs {} operands",
            a.id,
            b.id,
            a.operands.len(),
            b.operands.len()
        )));
    }

    for (oa, ob) in a.operands.iter().zip(b.operands.iter()) {
        match (oa, ob) {
            (Operand::Constant(_), Operand::Constant(_)) => {}
            (Operand::Argument(_), Operand::Argument(_)) => {}
            (Operand::Global(_), Operand::Global(_)) => {}
            (Operand::Value(ida), Operand::Value(idb)) => {
                let def_a = func_a.instruction(*ida).ok_or_else(|| {
                    PatchError::ir_shape(format!("operand {ida:?} has no definition in its function"))
                })?;
                let def_b = func_b.instruction(*idb).ok_or_else(|| {
                    PatchError::ir_shape(format!("operand {idb:?} has no definition in its function"))
                })?;
                if !equiv(def_a, func_a, def_b, func_b, memo)? {
                    return Ok(false);
                }
            }
            _ => return Ok(false),
        }
    }

    memo.insert(a.id, b.id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_ir::{BasicBlock, BlockId};

    fn mk(id: u32, text: &str, operands: Vec<Operand>) -> Instruction {
        Instruction {
            id: InstId(id),
            opcode: "x".to_string(),
            operands,
            text: text.to_string(),
            is_debug: false,
            is_terminator: false,
            is_branch: false,
            call: None,
        }
    }

    fn func_with(insts: Vec<Instruction>) -> Function {
        Function {
            name: "f".to_string(),
            params: vec![],
            is_variadic: false,
            is_intrinsic: false,
            entry: BlockId(0),
            blocks: vec![BasicBlock {
                id: BlockId(0),
                label: "entry".to_string(),
                instructions: insts,
                successors: vec![],
            }],
        }
    }

    #[test]
    fn ssa_renumbering_is_tolerated() {
        let a = mk(0, "%1 = add i32 %0, 1", vec![]);
        let b = mk(0, "%7 = add i32 %3, 1", vec![]);
        let fa = func_with(vec![a.clone()]);
        let fb = func_with(vec![b.clone()]);
        let mut memo = EquivMemo::new();
        assert!(equiv(&a, &fa, &b, &fb, &mut memo).unwrap());
    }

    #[test]
    fn debug_metadata_is_tolerated() {
        let a = mk(0, "call void @f(), !dbg !12", vec![]);
        let b = mk(0, "call void @f(), !dbg !99", vec![]);
        let fa = func_with(vec![a.clone()]);
        let fb = func_with(vec![b.clone()]);
        let mut memo = EquivMemo::new();
        assert!(equiv(&a, &fa, &b, &fb, &mut memo).unwrap());
    }

    #[test]
    fn struct_numbering_is_tolerated() {
        let a = mk(0, "%1 = load %struct.Foo.3, %struct.Foo.3* %0", vec![]);
        let b = mk(0, "%2 = load %struct.Foo.9, %struct.Foo.9* %5", vec![]);
        let fa = func_with(vec![a.clone()]);
        let fb = func_with(vec![b.clone()]);
        let mut memo = EquivMemo::new();
        assert!(equiv(&a, &fa, &b, &fb, &mut memo).unwrap());
    }

    #[test]
    fn differing_opcode_text_is_not_equivalent() {
        let a = mk(0, "%1 = add i32 %0, 1", vec![]);
        let b = mk(0, "%1 = sub i32 %0, 1", vec![]);
        let fa = func_with(vec![a.clone()]);
        let fb = func_with(vec![b.clone()]);
        let mut memo = EquivMemo::new();
        assert!(!equiv(&a, &fa, &b, &fb, &mut memo).unwrap());
    }

    #[test]
    fn recursive_operand_defs_must_also_be_equivalent() {
        let def_a = mk(0, "%0 = add i32 1, 1", vec![]);
        let def_b = mk(0, "%0 = sub i32 1, 1", vec![]);
        let use_a = mk(1, "%1 = mul i32 %0, 2", vec![Operand::Value(InstId(0))]);
        let use_b = mk(1, "%1 = mul i32 %0, 2", vec![Operand::Value(InstId(0))]);
        let fa = func_with(vec![def_a, use_a.clone()]);
        let fb = func_with(vec![def_b, use_b.clone()]);
        let mut memo = EquivMemo::new();
        assert!(!equiv(&use_a, &fa, &use_b, &fb, &mut memo).unwrap());
    }

    #[test]
    fn equal_arity_defs_are_memoized_positively() {
        let def_a = mk(0, "%0 = add i32 1, 1", vec![]);
        let def_b = mk(0, "%0 = add i32 1, 1", vec![]);
        let use_a = mk(1, "%1 = mul i32 %0, %0", vec![Operand::Value(InstId(0)), Operand::Value(InstId(0))]);
        let use_b = mk(1, "%1 = mul i32 %0, %0", vec![Operand::Value(InstId(0)), Operand::Value(InstId(0))]);
        let fa = func_with(vec![def_a, use_a.clone()]);
        let fb = func_with(vec![def_b, use_b.clone()]);
        let mut memo = EquivMemo::new();
        assert!(equiv(&use_a, &fa, &use_b, &fb, &mut memo).unwrap());
        assert_eq!(memo.get(&InstId(0)), Some(&InstId(0)));
    }

    #[test]
    fn operand_arity_mismatch_after_text_match_is_fatal() {
        let a = mk(0, "%1 = phi i32 [%0, %bb1]", vec![Operand::Value(InstId(9))]);
        let b = mk(0, "%1 = phi i32 [%0, %bb1]", vec![]);
        let fa = func_with(vec![a.clone()]);
        let fb = func_with(vec![b.clone()]);
        let mut memo = EquivMemo::new();
        let err = equiv(&a, &fa, &b, &fb, &mut memo).unwrap_err();
        assert!(matches!(err, PatchError::IrShape { .. }));
    }
}
