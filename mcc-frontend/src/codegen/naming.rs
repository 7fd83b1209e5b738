//! Label and temporary naming

use mcc_codegen::{Operand, RegClass};
use mcc_common::{LabelId, TempId};

/// Program-wide label counters, one sequence per label kind
#[derive(Debug, Default)]
pub struct LabelGenerator {
    next_loop: LabelId,
    next_else: LabelId,
    next_out: LabelId,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loop_label(&mut self) -> String {
        self.next_loop += 1;
        format!("loop_{}", self.next_loop)
    }

    pub fn else_label(&mut self) -> String {
        self.next_else += 1;
        format!("else_{}", self.next_else)
    }

    pub fn out_label(&mut self) -> String {
        self.next_out += 1;
        format!("out_{}", self.next_out)
    }
}

/// Per-function temporary counters
#[derive(Debug, Default)]
pub struct TempGenerator {
    int_count: TempId,
    float_count: TempId,
}

impl TempGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh temporary of the given class; ids start at 1
    pub fn fresh(&mut self, class: RegClass) -> Operand {
        let counter = match class {
            RegClass::Int => &mut self.int_count,
            RegClass::Float => &mut self.float_count,
        };
        *counter += 1;
        Operand::Temp(class, *counter)
    }

    pub fn int_count(&self) -> TempId {
        self.int_count
    }

    pub fn float_count(&self) -> TempId {
        self.float_count
    }
}
