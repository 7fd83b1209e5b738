//! MicroC Compiler - Frontend
//!
//! This crate provides the frontend components for the MicroC compiler:
//! - AST: the typed syntax tree handed over by the parser and type checker
//! - Symbols: storage locations for parameters, locals and globals
//! - Codegen: lowering of the typed AST to three-address instructions

pub mod ast;
pub mod codegen;
pub mod symbols;

pub use ast::{BinaryOp, CmpOp, Expr, ExprKind, Function, GlobalDecl, Program, Stmt};
pub use codegen::{generate_program, CodeGenerator, CodegenError, LoweredFunction, LoweredProgram};
pub use symbols::{GlobalScope, LocalScope, Storage, Symbol};

use mcc_common::CompilerError;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Parse a typed program from JSON
    pub fn parse_json(source: &str) -> Result<Program, CompilerError> {
        Program::from_json(source)
    }

    /// Parse and lower a typed program
    pub fn lower_json(source: &str) -> Result<LoweredProgram, CompilerError> {
        let program = Self::parse_json(source)?;
        generate_program(&program)
    }
}
