//! Call-target resolution: the one IR Accessor query complex enough to
//! deserve its own module. Everything else is a direct field/method access
//! on [`crate::module::Module`].

use crate::module::{Callee, Function, Instruction, Module};
use pd_common::{PatchError, PatchResult};

/// The outcome of resolving a call instruction's possible callees.
pub enum CalleeResolution<'m> {
    /// Inline assembly: skipped throughout priority propagation.
    InlineAsm,
    /// The called operand resolves to exactly one concrete, non-intrinsic function.
    Direct(&'m Function),
    /// An indirect call (through a function pointer): every function whose
    /// parameters are a prefix-compatible match for the call's argument types.
    /// Deliberately over-approximate.
    Indirect(Vec<&'m Function>),
}

/// Resolve `call`'s possible callees against `module`.
///
/// - A direct reference or an alias chain that bottoms out at a concrete,
///   non-intrinsic function yields exactly that function.
/// - An alias that does not resolve to a function is an IR-shape surprise:
///   the analyzer must abort rather than silently skip the call (§7 category 3).
/// - An indirect call widens to every function whose parameter list is a
///   prefix-compatible match for the call's static argument types.
pub fn possible_callees<'m>(
    module: &'m Module,
    call: &Instruction,
) -> PatchResult<CalleeResolution<'m>> {
    let site = call
        .call
        .as_ref()
        .ok_or_else(|| PatchError::ir_shape(format!("instruction {:?} is not a call", call.id)))?;

    if site.is_inline_asm {
        return Ok(CalleeResolution::InlineAsm);
    }

    match &site.callee {
        Callee::Direct(name) => {
            let f = module.function(name).ok_or_else(|| {
                PatchError::ir_shape(format!("call target '{name}' not found in module"))
            })?;
            if f.is_intrinsic {
                // Intrinsics contribute no priority of their own; treat as having no callees.
                return Ok(CalleeResolution::Indirect(Vec::new()));
            }
            Ok(CalleeResolution::Direct(f))
        }
        Callee::Alias(name) => {
            let resolved = module
                .resolve_alias(name)
                .ok_or_else(|| PatchError::ir_shape(format!("'{name}' is not a registered alias")))?;
            let f = module.function(&resolved).ok_or_else(|| {
                PatchError::ir_shape(format!(
                    "alias '{name}' does not resolve to a function (got '{resolved}')"
                ))
            })?;
            Ok(CalleeResolution::Direct(f))
        }
        Callee::Indirect => {
            let callees: Vec<&Function> = module
                .functions()
                .filter(|f| !f.is_intrinsic && f.accepts_arguments(&site.arg_types))
                .collect();
            Ok(CalleeResolution::Indirect(callees))
        }
    }
}
