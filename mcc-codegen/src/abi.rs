//! MicroC ABI Implementation
//!
//! This module implements the calling convention and stack frame layout,
//! including prologue/epilogue generation and the program entry sequence.

use crate::asm::{Inst, Operand, RegClass};
use mcc_common::WORD_SIZE;

/// MicroC Calling Convention
///
/// Integer register usage:
/// - x0: Zero register
/// - x1: Return address
/// - x2: Stack pointer
/// - x3: Scratch for global address materialisation
/// - x8: Frame pointer
///
/// All other integer registers and every float register are allocatable and
/// callee-saved. Arguments and the return value travel on the stack.
///
/// Frame layout seen from the callee (fp = sp at entry):
///
/// ```text
///   12 + 4*(n-1-i)(fp)   argument i of n
///   8(fp)                return value slot
///   4(fp)                caller's return address
///   0(fp)                caller's frame pointer
///   -4*(k+1)(fp)         local k, then spill slots
/// ```
pub struct CallingConvention;

impl CallingConvention {
    /// Integer register indices that are never allocated
    pub const RESERVED_INT: [usize; 5] = [0, 1, 2, 3, 8];

    /// Float register indices that are never allocated
    pub const RESERVED_FLOAT: [usize; 0] = [];

    /// Scratch register used to hold global addresses during fills and spills
    pub const SCRATCH_INDEX: usize = 3;

    /// Offset of the return value slot from the frame pointer
    pub const RETURN_SLOT_OFFSET: i32 = 8;

    /// Offset of the last pushed argument from the frame pointer
    pub const FIRST_PARAM_OFFSET: i32 = 12;

    /// Scratch register operand
    pub fn scratch() -> Operand {
        Operand::Phys(RegClass::Int, Self::SCRATCH_INDEX)
    }

    /// Frame offsets of all `count` parameters, in declaration order
    pub fn param_offsets(count: usize) -> impl Iterator<Item = i32> {
        (0..count)
            .map(move |index| Self::FIRST_PARAM_OFFSET + WORD_SIZE * (count - 1 - index) as i32)
    }

    /// Frame offset of the `slot`-th local word (locals first, then spill slots)
    pub fn local_offset(slot: usize) -> i32 {
        -WORD_SIZE * (slot as i32 + 1)
    }

    /// Entry label of a function
    pub fn function_label(name: &str) -> String {
        format!("func_{}", name)
    }

    /// Shared return label every `return` in a function jumps to
    pub fn return_label(name: &str) -> String {
        format!("func_ret_{}", name)
    }
}

/// Stack Frame
///
/// Built once register allocation has decided how many spill slots the
/// function needs and which physical registers it touches.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Function name (without the `func_` prefix)
    pub name: String,

    /// Words reserved below the saved frame pointer: locals plus spill slots
    pub frame_words: usize,

    /// Integer registers saved in the prologue, ascending
    pub saved_int: Vec<usize>,

    /// Float registers saved in the prologue, ascending
    pub saved_float: Vec<usize>,
}

impl Frame {
    pub fn new(name: impl Into<String>, frame_words: usize) -> Self {
        Self {
            name: name.into(),
            frame_words,
            saved_int: Vec::new(),
            saved_float: Vec::new(),
        }
    }

    /// Set the callee-saved registers
    pub fn with_saved(
        mut self,
        int: impl IntoIterator<Item = usize>,
        float: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.saved_int = int.into_iter().collect();
        self.saved_float = float.into_iter().collect();
        self
    }

    /// Generate function prologue
    ///
    /// The prologue:
    /// 1. Emits the function label
    /// 2. Saves the caller's frame pointer and points fp at it
    /// 3. Reserves the local and spill area
    /// 4. Pushes every saved integer register, then every saved float register
    pub fn gen_prologue(&self) -> Vec<Inst> {
        let mut code = vec![
            Inst::Label(CallingConvention::function_label(&self.name)),
            Inst::Sw(Operand::Fp, Operand::Sp, 0),
            Inst::Mv(Operand::Fp, Operand::Sp),
            Inst::Addi(Operand::Sp, Operand::Sp, -WORD_SIZE),
            Inst::Addi(Operand::Sp, Operand::Sp, -WORD_SIZE * self.frame_words as i32),
        ];

        for &idx in &self.saved_int {
            code.push(Inst::Sw(Operand::Phys(RegClass::Int, idx), Operand::Sp, 0));
            code.push(Inst::Addi(Operand::Sp, Operand::Sp, -WORD_SIZE));
        }
        for &idx in &self.saved_float {
            code.push(Inst::Fsw(Operand::Phys(RegClass::Float, idx), Operand::Sp, 0));
            code.push(Inst::Addi(Operand::Sp, Operand::Sp, -WORD_SIZE));
        }

        code
    }

    /// Generate function epilogue
    ///
    /// Runs after the body's shared return label:
    /// 1. Restores float registers, then integer registers, in reverse order
    /// 2. Deallocates the frame and reloads the caller's frame pointer
    /// 3. Returns to the caller
    pub fn gen_epilogue(&self) -> Vec<Inst> {
        let mut code = Vec::new();

        for &idx in self.saved_float.iter().rev() {
            code.push(Inst::Addi(Operand::Sp, Operand::Sp, WORD_SIZE));
            code.push(Inst::Flw(Operand::Phys(RegClass::Float, idx), Operand::Sp, 0));
        }
        for &idx in self.saved_int.iter().rev() {
            code.push(Inst::Addi(Operand::Sp, Operand::Sp, WORD_SIZE));
            code.push(Inst::Lw(Operand::Phys(RegClass::Int, idx), Operand::Sp, 0));
        }

        code.push(Inst::Mv(Operand::Sp, Operand::Fp));
        code.push(Inst::Lw(Operand::Fp, Operand::Fp, 0));
        code.push(Inst::Ret);

        code
    }
}

/// Program entry sequence: set up fp, call main, halt
pub fn program_prelude() -> Vec<Inst> {
    vec![
        Inst::Mv(Operand::Fp, Operand::Sp),
        Inst::Jr(CallingConvention::function_label("main")),
        Inst::Halt,
        Inst::Blank,
    ]
}
