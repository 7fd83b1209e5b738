//! Code generation from the typed AST to three-address instructions
//!
//! Every node lowers to a [`CodeObject`]: its instructions plus a description
//! of the value they leave behind. Parents splice their children's code in
//! evaluation order. The output still names symbolic temporaries; register
//! allocation happens in the backend.

mod code_object;
mod errors;
mod function_gen;
mod naming;
pub mod expressions;
pub mod statements;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

pub use code_object::{CodeObject, CodeValue, RValue};
pub use errors::CodegenError;
pub use expressions::ExpressionGenerator;
pub use naming::{LabelGenerator, TempGenerator};
pub use statements::StatementGenerator;

use crate::ast::Program;
use crate::symbols::Storage;
use log::debug;
use mcc_codegen::{program_prelude, Inst, Operand, StringConstant};
use mcc_common::{CompilerError, TempId, Type};

/// One function after lowering, before register allocation
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredFunction {
    pub name: String,
    pub return_type: Type,
    /// Body ending in the shared `func_ret_<name>:` label; no prologue or epilogue yet
    pub body: Vec<Inst>,
    pub num_locals: usize,
    pub int_temps: TempId,
    pub float_temps: TempId,
    /// Homes of the parameters and locals
    pub scope_homes: Vec<Operand>,
}

/// A whole program after lowering
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredProgram {
    /// Entry sequence that calls `main`
    pub prelude: Vec<Inst>,
    pub functions: Vec<LoweredFunction>,
    /// Homes of every global variable
    pub globals: Vec<Operand>,
    /// String constants for the data section
    pub strings: Vec<StringConstant>,
}

impl LoweredProgram {
    pub fn function(&self, name: &str) -> Option<&LoweredFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Function called by the program prelude
const ENTRY_POINT: &str = "main";

/// Typed AST to three-address code generator
#[derive(Debug, Default)]
pub struct CodeGenerator {
    labels: LabelGenerator,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower every function of a program; the program must define `main`
    pub fn generate(mut self, program: &Program) -> Result<LoweredProgram, CompilerError> {
        debug!(
            "Lowering program: {} globals, {} functions",
            program.globals.len(),
            program.functions.len()
        );

        if program.function(ENTRY_POINT).is_none() {
            return Err(CompilerError::codegen_error(
                ENTRY_POINT,
                CodegenError::MissingEntryPoint.to_string(),
            ));
        }

        let functions = program
            .functions
            .iter()
            .map(|function| function_gen::generate_function(&mut self.labels, function))
            .collect::<Result<Vec<_>, _>>()?;

        // String constants are only ever addressed, never loaded
        let globals = program
            .globals
            .iter()
            .filter(|g| g.value.is_none())
            .map(|g| g.symbol.home())
            .collect();

        let strings = program
            .globals
            .iter()
            .filter_map(|g| match (&g.value, &g.symbol.storage) {
                (Some(value), Storage::Global { address }) => Some(StringConstant {
                    name: g.symbol.name.clone(),
                    address: address.clone(),
                    value: value.clone(),
                }),
                _ => None,
            })
            .collect();

        Ok(LoweredProgram {
            prelude: program_prelude(),
            functions,
            globals,
            strings,
        })
    }
}

/// Lower a program with a fresh generator
pub fn generate_program(program: &Program) -> Result<LoweredProgram, CompilerError> {
    CodeGenerator::new().generate(program)
}
