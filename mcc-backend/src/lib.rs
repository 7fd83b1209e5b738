//! MicroC Compiler - Backend
//!
//! This crate takes lowered three-address code to assembly:
//! - `blocks` - basic block splitting
//! - `liveness` - per-block backward liveness
//! - `regmgmt` - block-local register allocation with spilling
//! - `function` - per-function frames built from the allocation results

pub mod blocks;
pub mod function;
pub mod liveness;
pub mod regmgmt;

pub use blocks::{split_blocks, BasicBlock, BlockError};
pub use function::{allocate_function, AllocatedFunction};
pub use liveness::{analyze_block, exit_live_set, BlockLiveness, LiveSet};
pub use regmgmt::{RegAllocError, UsedRegisters};

use log::info;
use mcc_codegen::{emit_data_section, emit_instructions, Frame, Inst, StringConstant};
use mcc_common::CompilerError;
use mcc_frontend::{generate_program, LoweredProgram, Program};
use serde::Deserialize;

/// Register bank sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllocOptions {
    pub int_registers: usize,
    pub float_registers: usize,
}

impl Default for AllocOptions {
    fn default() -> Self {
        Self {
            int_registers: 16,
            float_registers: 16,
        }
    }
}

impl AllocOptions {
    /// Smallest integer bank: every reserved register plus four allocatable ones
    pub const MIN_INT_REGISTERS: usize = 9;
    pub const MIN_FLOAT_REGISTERS: usize = 2;

    pub fn validate(&self) -> Result<(), CompilerError> {
        if self.int_registers < Self::MIN_INT_REGISTERS {
            return Err(CompilerError::config_error(format!(
                "int_registers must be at least {} (got {})",
                Self::MIN_INT_REGISTERS,
                self.int_registers
            )));
        }
        if self.float_registers < Self::MIN_FLOAT_REGISTERS {
            return Err(CompilerError::config_error(format!(
                "float_registers must be at least {} (got {})",
                Self::MIN_FLOAT_REGISTERS,
                self.float_registers
            )));
        }
        Ok(())
    }

    /// Parse options from JSON; missing fields keep their defaults
    pub fn from_json(source: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(source).map_err(|e| CompilerError::config_error(e.to_string()))
    }
}

/// A whole program after register allocation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    pub prelude: Vec<Inst>,
    pub functions: Vec<AllocatedFunction>,
    pub strings: Vec<StringConstant>,
}

impl CompiledProgram {
    pub fn function(&self, name: &str) -> Option<&AllocatedFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Prelude followed by every function, each ended by a blank line
    pub fn instructions(&self) -> Vec<Inst> {
        let mut code = self.prelude.clone();
        for function in &self.functions {
            code.extend(function.instructions());
            code.push(Inst::Blank);
        }
        code
    }

    /// Code followed by the data section
    pub fn to_assembly(&self) -> String {
        emit_instructions(&self.instructions()) + &emit_data_section(&self.strings)
    }
}

/// Allocate registers for every function of a lowered program
pub fn compile_program(
    lowered: &LoweredProgram,
    options: &AllocOptions,
) -> Result<CompiledProgram, CompilerError> {
    options.validate()?;
    info!("Compiling {} functions", lowered.functions.len());

    let functions = lowered
        .functions
        .iter()
        .map(|function| allocate_function(function, &lowered.globals, options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledProgram {
        prelude: lowered.prelude.clone(),
        functions,
        strings: lowered.strings.clone(),
    })
}

/// Lower and allocate a typed program
pub fn compile(
    program: &Program,
    options: &AllocOptions,
) -> Result<CompiledProgram, CompilerError> {
    let lowered = generate_program(program)?;
    compile_program(&lowered, options)
}

/// Three-address listing of a lowered program: symbolic operands, frames
/// sized for the locals only, no register saves
pub fn emit_three_address(lowered: &LoweredProgram) -> String {
    let mut code = lowered.prelude.clone();
    for function in &lowered.functions {
        let frame = Frame::new(&function.name, function.num_locals);
        code.extend(frame.gen_prologue());
        code.extend(function.body.iter().cloned());
        code.extend(frame.gen_epilogue());
        code.push(Inst::Blank);
    }
    emit_instructions(&code) + &emit_data_section(&lowered.strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_common::Type;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_validation() {
        assert!(AllocOptions::default().validate().is_ok());

        let small = AllocOptions {
            int_registers: 8,
            ..AllocOptions::default()
        };
        assert!(matches!(small.validate(), Err(CompilerError::ConfigError { .. })));

        let small = AllocOptions {
            float_registers: 1,
            ..AllocOptions::default()
        };
        assert!(matches!(small.validate(), Err(CompilerError::ConfigError { .. })));
    }

    #[test]
    fn test_options_from_json() {
        let options = AllocOptions::from_json(r#"{ "int_registers": 12 }"#).unwrap();
        assert_eq!(
            options,
            AllocOptions {
                int_registers: 12,
                float_registers: 16,
            }
        );
        assert!(AllocOptions::from_json("{ \"int_registers\": -1 }").is_err());
    }

    #[test]
    fn test_program_without_main() {
        let err = compile(&Program::default(), &AllocOptions::default()).unwrap_err();
        assert!(matches!(err, CompilerError::CodegenError { .. }));
    }

    #[test]
    fn test_empty_main() {
        let main = mcc_frontend::LocalScope::new(&[]).into_function("main", Type::Void, Vec::new());
        let program = Program {
            globals: Vec::new(),
            functions: vec![main],
        };
        let compiled = compile(&program, &AllocOptions::default()).unwrap();

        let expected = [
            "    mv fp, sp",
            "    jr func_main",
            "    halt",
            "",
            "func_main:",
            "    sw fp, 0(sp)",
            "    mv fp, sp",
            "    addi sp, sp, -4",
            "    addi sp, sp, 0",
            "func_ret_main:",
            "    mv sp, fp",
            "    lw fp, 0(fp)",
            "    ret",
            "",
        ];
        assert_eq!(compiled.to_assembly(), expected.join("\n") + "\n");
    }
}
