//! Register Management Module
//!
//! Local register allocation, one basic block at a time.
//!
//! ## Architecture
//!
//! - `BlockAllocator` - rewrites one block's symbolic operands to physical registers
//! - `RegisterBank` - slot states and dirty bits for one register class
//! - `SpillArea` - frame slots of spilled temporaries, shared by all blocks of a function
//!
//! ## Invariants
//!
//! - A fresh allocator is built for every block; nothing is resident on entry
//! - Every dirty register whose operand is live on exit is written back before
//!   control leaves the block
//! - Sources are resolved before the destination is allocated, and dead
//!   sources are released first so the destination may reuse their register

pub use self::allocator::{AllocatedBlock, BlockAllocator};
pub use self::bank::{RegisterBank, SlotState};
pub use self::spill::SpillArea;

mod allocator;
mod bank;
mod spill;


use mcc_codegen::RegClass;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegAllocError {
    #[error("No {class} register available for '{operand}'")]
    Exhausted { class: RegClass, operand: String },

    #[error("Temporary '{0}' is read before it is written")]
    UndefinedTemporary(String),
}

/// Physical registers written by a block or function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsedRegisters {
    pub int: BTreeSet<usize>,
    pub float: BTreeSet<usize>,
}

impl UsedRegisters {
    pub fn record(&mut self, class: RegClass, index: usize) {
        match class {
            RegClass::Int => self.int.insert(index),
            RegClass::Float => self.float.insert(index),
        };
    }

    pub fn merge(&mut self, other: &UsedRegisters) {
        self.int.extend(other.int.iter().copied());
        self.float.extend(other.float.iter().copied());
    }
}
