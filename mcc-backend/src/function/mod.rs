//! Function assembly
//!
//! Splits a lowered function into blocks, allocates each block with a fresh
//! allocator, then wraps the concatenated result in a prologue and epilogue
//! sized by the spill area and the registers the blocks touched.

use crate::blocks::split_blocks;
use crate::liveness::{analyze_block, exit_live_set};
use crate::regmgmt::{BlockAllocator, SpillArea, UsedRegisters};
use crate::AllocOptions;
use log::{debug, info};
use mcc_codegen::{Frame, Inst, Operand};
use mcc_common::CompilerError;
use mcc_frontend::LoweredFunction;

/// One function after register allocation
#[derive(Debug, Clone, PartialEq)]
pub struct AllocatedFunction {
    pub name: String,
    pub frame: Frame,
    /// Allocated body, still without prologue and epilogue
    pub body: Vec<Inst>,
    pub used: UsedRegisters,
}

impl AllocatedFunction {
    /// Prologue, body and epilogue
    pub fn instructions(&self) -> Vec<Inst> {
        let mut code = self.frame.gen_prologue();
        code.extend(self.body.iter().cloned());
        code.extend(self.frame.gen_epilogue());
        code
    }
}

/// Allocate registers for every block of `lowered`
///
/// `globals` are the homes of the program's global variables; together with
/// the function's own parameters and locals they are live at every block exit.
pub fn allocate_function(
    lowered: &LoweredFunction,
    globals: &[Operand],
    options: &AllocOptions,
) -> Result<AllocatedFunction, CompilerError> {
    info!("Allocating registers for '{}'", lowered.name);

    let blocks = split_blocks(&lowered.body)
        .map_err(|e| CompilerError::block_error(&lowered.name, e.to_string()))?;
    let exit_live = exit_live_set(&lowered.scope_homes, globals);
    let mut spills = SpillArea::new(lowered.num_locals);
    let mut used = UsedRegisters::default();
    let mut body = Vec::with_capacity(lowered.body.len());

    for block in &blocks {
        let liveness = analyze_block(&block.instructions, &exit_live);
        let allocated = BlockAllocator::new(options, &mut spills)
            .run(block, &liveness, &exit_live)
            .map_err(|e| CompilerError::regalloc_error(&lowered.name, e.to_string()))?;
        used.merge(&allocated.used);
        body.extend(allocated.instructions);
    }

    debug!(
        "'{}': {} blocks, {} spill slots, int {:?}, float {:?}",
        lowered.name,
        blocks.len(),
        spills.len(),
        used.int,
        used.float
    );

    let frame = Frame::new(&lowered.name, spills.frame_words())
        .with_saved(used.int.iter().copied(), used.float.iter().copied());

    Ok(AllocatedFunction {
        name: lowered.name.clone(),
        frame,
        body,
        used,
    })
}
