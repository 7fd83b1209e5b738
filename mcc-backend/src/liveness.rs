//! Per-block backward liveness
//!
//! Walks a block from its last instruction to its first:
//! `live_before = (live_after - def) ∪ uses`, counting only symbolic
//! operands. Roles come from the instruction's operand table, the same one
//! the allocator rewrites through.

use mcc_codegen::{Inst, Operand};
use std::collections::BTreeSet;

pub type LiveSet = BTreeSet<Operand>;

/// Liveness facts for one block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLiveness {
    /// Operands live on entry to the block
    pub live_in: LiveSet,
    /// Operands live right after each instruction, by index
    pub live_after: Vec<LiveSet>,
}

/// Everything that may be read after a block exits: the function's
/// parameters and locals plus every global variable
pub fn exit_live_set(scope_homes: &[Operand], globals: &[Operand]) -> LiveSet {
    scope_homes
        .iter()
        .chain(globals)
        .filter(|op| op.is_memory_homed())
        .cloned()
        .collect()
}

pub fn analyze_block(instructions: &[Inst], exit_live: &LiveSet) -> BlockLiveness {
    let mut live_after = vec![LiveSet::new(); instructions.len()];
    let mut live = exit_live.clone();

    for (index, inst) in instructions.iter().enumerate().rev() {
        live_after[index] = live.clone();
        if let Some(def) = inst.def().filter(|d| d.is_symbolic()) {
            live.remove(def);
        }
        for operand in inst.uses().into_iter().filter(|u| u.is_symbolic()) {
            live.insert(operand.clone());
        }
    }

    BlockLiveness {
        live_in: live,
        live_after,
    }
}
