//! Block-local register allocator
//!
//! Rewrites one basic block in program order. Sources are made resident
//! first (filling from their home), dead sources are released, then the
//! destination gets a register and is marked dirty. When a register has to
//! be reclaimed, clean residents go before dirty ones.

use super::bank::RegisterBank;
use super::spill::SpillArea;
use super::{RegAllocError, UsedRegisters};
use crate::blocks::BasicBlock;
use crate::liveness::{BlockLiveness, LiveSet};
use crate::AllocOptions;
use log::{debug, trace};
use mcc_codegen::{CallingConvention, Inst, Operand, RegClass};

/// A block rewritten to physical registers
#[derive(Debug, Clone, PartialEq)]
pub struct AllocatedBlock {
    pub instructions: Vec<Inst>,
    pub used: UsedRegisters,
}

/// Where a resident operand is filled from
enum Home {
    Frame(i32),
    Absolute(String),
    Immediate(String),
}

pub struct BlockAllocator<'a> {
    int_bank: RegisterBank,
    float_bank: RegisterBank,
    spills: &'a mut SpillArea,
    used: UsedRegisters,
    /// Register of the first source while the second is being resolved
    protected: Option<(RegClass, usize)>,
    /// Sources of the instruction being rewritten; never chosen as victims
    pending: Vec<Operand>,
    instructions: Vec<Inst>,
}

impl<'a> BlockAllocator<'a> {
    pub fn new(options: &AllocOptions, spills: &'a mut SpillArea) -> Self {
        Self {
            int_bank: RegisterBank::new(
                RegClass::Int,
                options.int_registers,
                &CallingConvention::RESERVED_INT,
            ),
            float_bank: RegisterBank::new(
                RegClass::Float,
                options.float_registers,
                &CallingConvention::RESERVED_FLOAT,
            ),
            spills,
            used: UsedRegisters::default(),
            protected: None,
            pending: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Rewrite `block`, writing back everything in `exit_live` before control leaves it
    pub fn run(
        mut self,
        block: &BasicBlock,
        liveness: &BlockLiveness,
        exit_live: &LiveSet,
    ) -> Result<AllocatedBlock, RegAllocError> {
        debug!(
            "Allocating block {} ({} instructions)",
            block.label().unwrap_or("<entry>"),
            block.len()
        );
        let last = block.len().saturating_sub(1);

        for (index, inst) in block.instructions.iter().enumerate() {
            if inst.is_pseudo() {
                self.instructions.push(inst.clone());
                continue;
            }
            if inst.is_call() {
                self.flush_memory_residents();
                self.instructions.push(inst.clone());
                continue;
            }

            let rewritten = self.rewrite(inst, &liveness.live_after[index])?;
            if index == last && inst.is_terminator() {
                self.write_back_live(exit_live);
            }
            self.instructions.push(lower_stack_op(rewritten));
        }

        if !block.ends_in_jump() {
            self.write_back_live(exit_live);
        }

        Ok(AllocatedBlock {
            instructions: self.instructions,
            used: self.used,
        })
    }

    fn bank(&self, class: RegClass) -> &RegisterBank {
        match class {
            RegClass::Int => &self.int_bank,
            RegClass::Float => &self.float_bank,
        }
    }

    fn bank_mut(&mut self, class: RegClass) -> &mut RegisterBank {
        match class {
            RegClass::Int => &mut self.int_bank,
            RegClass::Float => &mut self.float_bank,
        }
    }

    fn rewrite(&mut self, inst: &Inst, live: &LiveSet) -> Result<Inst, RegAllocError> {
        trace!("rewrite '{}', live after: {:?}", inst, live);
        let mut rewritten = inst.clone();
        self.pending = inst.uses().into_iter().filter(|op| !op.is_fixed()).cloned().collect();

        let operands = rewritten.operands_mut();
        let mut sources = Vec::new();
        for (class, operand) in operands.uses.into_iter().flatten() {
            if operand.is_fixed() {
                continue;
            }
            let index = self.check(class, operand, live)?;
            if self.protected.is_none() {
                self.protected = Some((class, index));
            }
            let source = std::mem::replace(operand, self.bank(class).register(index));
            sources.push((class, source));
        }
        self.protected = None;
        self.pending.clear();

        for (class, source) in &sources {
            if live.contains(source) {
                continue;
            }
            if let Some(index) = self.bank(*class).find(source) {
                trace!("  {} is dead, releasing {}", source, self.bank(*class).register(index));
                self.free(*class, index, live);
            }
        }

        if let Some((class, operand)) = operands.def {
            if !operand.is_fixed() {
                let index = match self.bank(class).find(operand) {
                    Some(index) => index,
                    None => {
                        let index = self.allocate(class, operand, live)?;
                        self.bank_mut(class).assign(index, operand.clone());
                        index
                    }
                };
                self.bank_mut(class).mark_dirty(index);
                self.used.record(class, index);
                *operand = self.bank(class).register(index);
            }
        }

        Ok(rewritten)
    }

    /// Make `operand` resident, filling it from its home if needed
    fn check(
        &mut self,
        class: RegClass,
        operand: &Operand,
        live: &LiveSet,
    ) -> Result<usize, RegAllocError> {
        if let Some(index) = self.bank(class).find(operand) {
            trace!("  {} already in {}", operand, self.bank(class).register(index));
            return Ok(index);
        }

        let home = self
            .home(operand)
            .ok_or_else(|| RegAllocError::UndefinedTemporary(operand.to_string()))?;
        let index = self.allocate(class, operand, live)?;
        let register = self.bank(class).register(index);

        match home {
            Home::Frame(offset) => {
                self.instructions
                    .push(Inst::load(class, register, Operand::Fp, offset));
            }
            Home::Absolute(address) => {
                let scratch = CallingConvention::scratch();
                self.instructions.push(Inst::La(scratch.clone(), address));
                self.instructions.push(Inst::load(class, register, scratch, 0));
            }
            Home::Immediate(text) => self.instructions.push(match class {
                RegClass::Int => Inst::Li(register, text),
                RegClass::Float => Inst::FImm(register, text),
            }),
        }
        trace!("  filled {} into {}", operand, self.bank(class).register(index));

        self.bank_mut(class).assign(index, operand.clone());
        self.used.record(class, index);
        Ok(index)
    }

    fn home(&self, operand: &Operand) -> Option<Home> {
        match operand {
            Operand::Temp(..) => self.spills.offset_of(operand).map(Home::Frame),
            Operand::Local(offset) => Some(Home::Frame(*offset)),
            Operand::Global { address, .. } => Some(Home::Absolute(address.clone())),
            Operand::Imm(text) => Some(Home::Immediate(text.clone())),
            _ => None,
        }
    }

    /// Pick a register for `operand`: free, then clean, then any non-pending resident
    fn allocate(
        &mut self,
        class: RegClass,
        operand: &Operand,
        live: &LiveSet,
    ) -> Result<usize, RegAllocError> {
        let victim = {
            let bank = self.bank(class);
            if let Some(index) = bank.first_free() {
                trace!("  allocated free {} for {}", bank.register(index), operand);
                return Ok(index);
            }
            let skip = |index: usize, held: &Operand| {
                self.protected == Some((class, index)) || self.pending.contains(held)
            };
            bank.first_clean(skip).or_else(|| bank.first_occupied(skip))
        };

        match victim {
            Some(index) => {
                debug!(
                    "Evicting {} to make room for '{}'",
                    self.bank(class).register(index),
                    operand
                );
                self.free(class, index, live);
                Ok(index)
            }
            None => Err(RegAllocError::Exhausted {
                class,
                operand: operand.to_string(),
            }),
        }
    }

    /// Release a register, writing its value back first if it is dirty and still live
    fn free(&mut self, class: RegClass, index: usize, live: &LiveSet) {
        if let Some(operand) = self.bank(class).holder(index).cloned() {
            if self.bank(class).is_dirty(index) && live.contains(&operand) {
                self.write_back(class, index, &operand);
            }
        }
        self.bank_mut(class).release(index);
    }

    fn write_back(&mut self, class: RegClass, index: usize, operand: &Operand) {
        let register = self.bank(class).register(index);
        trace!("  writing back {} from {}", operand, register);
        match operand {
            Operand::Temp(..) => {
                let offset = self.spills.slot_for(operand);
                self.instructions
                    .push(Inst::store(class, register, Operand::Fp, offset));
            }
            Operand::Local(offset) => {
                self.instructions
                    .push(Inst::store(class, register, Operand::Fp, *offset));
            }
            Operand::Global { address, .. } => {
                let scratch = CallingConvention::scratch();
                self.instructions.push(Inst::La(scratch.clone(), address.clone()));
                self.instructions.push(Inst::store(class, register, scratch, 0));
            }
            // Immediates are never dirty
            _ => {}
        }
    }

    /// Write back dirty residents that are live on exit; they stay resident and become clean
    fn write_back_live(&mut self, exit_live: &LiveSet) {
        for class in [RegClass::Int, RegClass::Float] {
            let dirty: Vec<(usize, Operand)> = self
                .bank(class)
                .residents()
                .filter(|(index, operand)| {
                    self.bank(class).is_dirty(*index) && exit_live.contains(*operand)
                })
                .map(|(index, operand)| (index, operand.clone()))
                .collect();
            for (index, operand) in dirty {
                self.write_back(class, index, &operand);
                self.bank_mut(class).mark_clean(index);
            }
        }
    }

    /// Before a call: the callee may read or write any variable, so every
    /// memory-homed resident goes back home and is dropped
    fn flush_memory_residents(&mut self) {
        for class in [RegClass::Int, RegClass::Float] {
            let residents: Vec<(usize, Operand)> = self
                .bank(class)
                .residents()
                .filter(|(_, operand)| operand.is_memory_homed())
                .map(|(index, operand)| (index, operand.clone()))
                .collect();
            for (index, operand) in residents {
                if self.bank(class).is_dirty(index) {
                    self.write_back(class, index, &operand);
                }
                self.bank_mut(class).release(index);
            }
        }
    }
}

/// Stack pseudo-ops become plain memory accesses at `0(sp)`
fn lower_stack_op(inst: Inst) -> Inst {
    match inst {
        Inst::PushInt(value) => Inst::Sw(value, Operand::Sp, 0),
        Inst::PushFloat(value) => Inst::Fsw(value, Operand::Sp, 0),
        Inst::PopInt(dest) => Inst::Lw(dest, Operand::Sp, 0),
        Inst::PopFloat(dest) => Inst::Flw(dest, Operand::Sp, 0),
        other => other,
    }
}
