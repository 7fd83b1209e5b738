//! Function-wide spill area
//!
//! Spilled temporaries get a permanent frame slot below the locals the first
//! time they are written back. Slots outlive the block that created them, so
//! a later block can still reload the value.

use mcc_codegen::{CallingConvention, Operand};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct SpillArea {
    num_locals: usize,
    slots: BTreeMap<Operand, i32>,
}

impl SpillArea {
    pub fn new(num_locals: usize) -> Self {
        Self {
            num_locals,
            slots: BTreeMap::new(),
        }
    }

    /// Frame offset of an already spilled temporary
    pub fn offset_of(&self, temp: &Operand) -> Option<i32> {
        self.slots.get(temp).copied()
    }

    /// Frame offset for `temp`, allocating the next slot on first use
    pub fn slot_for(&mut self, temp: &Operand) -> i32 {
        if let Some(offset) = self.offset_of(temp) {
            return offset;
        }
        let offset = CallingConvention::local_offset(self.num_locals + self.slots.len());
        self.slots.insert(temp.clone(), offset);
        offset
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Words the frame reserves below the saved frame pointer
    pub fn frame_words(&self) -> usize {
        self.num_locals + self.slots.len()
    }
}
