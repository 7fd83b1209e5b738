//! MicroC Compiler - Target Instruction Model
//!
//! This crate describes what the rest of the compiler emits:
//!
//! - The instruction set and operand model, including the operand role table
//! - ABI implementation (calling convention, stack frames, program entry)
//! - Assembly text emission, including the string data section

pub mod abi;
pub mod asm;
pub mod emit;

pub use abi::{program_prelude, CallingConvention, Frame};
pub use asm::{BranchCond, Inst, Operand, Operands, RegClass};
pub use emit::{emit_data_section, emit_instructions, emit_line, StringConstant};
