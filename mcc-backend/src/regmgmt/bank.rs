//! Physical register banks
//!
//! One bank per register class. Each slot is free, reserved for a fixed
//! purpose, or holds a symbolic operand; a parallel dirty bit records
//! whether the register has been written since it was filled.

use mcc_codegen::{Operand, RegClass};

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Free,
    Reserved,
    Holds(Operand),
}

#[derive(Debug, Clone)]
pub struct RegisterBank {
    class: RegClass,
    slots: Vec<SlotState>,
    dirty: Vec<bool>,
}

impl RegisterBank {
    /// Create a bank of `size` registers; reserved indices beyond the bank are ignored
    pub fn new(class: RegClass, size: usize, reserved: &[usize]) -> Self {
        let slots = (0..size)
            .map(|index| {
                if reserved.contains(&index) {
                    SlotState::Reserved
                } else {
                    SlotState::Free
                }
            })
            .collect();
        Self {
            class,
            slots,
            dirty: vec![false; size],
        }
    }

    pub fn class(&self) -> RegClass {
        self.class
    }

    /// Physical register operand for a slot
    pub fn register(&self, index: usize) -> Operand {
        Operand::Phys(self.class, index)
    }

    /// Slot currently holding `operand`
    pub fn find(&self, operand: &Operand) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, SlotState::Holds(held) if held == operand))
    }

    pub fn holder(&self, index: usize) -> Option<&Operand> {
        match self.slots.get(index) {
            Some(SlotState::Holds(operand)) => Some(operand),
            _ => None,
        }
    }

    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == SlotState::Free)
    }

    /// First clean occupied slot not excluded by `skip`
    pub fn first_clean(&self, skip: impl Fn(usize, &Operand) -> bool) -> Option<usize> {
        self.residents()
            .find(|&(index, operand)| !self.dirty[index] && !skip(index, operand))
            .map(|(index, _)| index)
    }

    /// First occupied slot not excluded by `skip`, dirty or not
    pub fn first_occupied(&self, skip: impl Fn(usize, &Operand) -> bool) -> Option<usize> {
        self.residents()
            .find(|&(index, operand)| !skip(index, operand))
            .map(|(index, _)| index)
    }

    /// Occupied slots in index order
    pub fn residents(&self) -> impl Iterator<Item = (usize, &Operand)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match slot {
            SlotState::Holds(operand) => Some((index, operand)),
            _ => None,
        })
    }

    /// Record that `index` now holds a freshly filled, clean copy of `operand`
    pub fn assign(&mut self, index: usize, operand: Operand) {
        self.slots[index] = SlotState::Holds(operand);
        self.dirty[index] = false;
    }

    pub fn mark_dirty(&mut self, index: usize) {
        self.dirty[index] = true;
    }

    pub fn mark_clean(&mut self, index: usize) {
        self.dirty[index] = false;
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.dirty.get(index).copied().unwrap_or(false)
    }

    pub fn release(&mut self, index: usize) {
        self.slots[index] = SlotState::Free;
        self.dirty[index] = false;
    }
}
