//! Statement code generation modules

mod assignments;
mod control_flow;
mod io;
mod jumps;
mod misc;

pub use assignments::{generate_assignment, store_to};
pub use control_flow::{branch_unless, generate_if, generate_while};
pub use io::{generate_read, generate_write};
pub use jumps::generate_return;
pub use misc::{generate_expression_stmt, generate_free};

use super::errors::CodegenError;
use super::expressions::ExpressionGenerator;
use super::naming::{LabelGenerator, TempGenerator};
use crate::ast::Stmt;
use mcc_codegen::Inst;
use mcc_common::Type;

/// Statement generator context
pub struct StatementGenerator<'a> {
    pub labels: &'a mut LabelGenerator,
    pub temps: &'a mut TempGenerator,
    pub function_name: &'a str,
    pub return_type: &'a Type,
}

impl<'a> StatementGenerator<'a> {
    /// Lower one statement
    pub fn generate(&mut self, stmt: &Stmt) -> Result<Vec<Inst>, CodegenError> {
        match stmt {
            Stmt::Assign { target, value } => assignments::generate_assignment(self, target, value),

            Stmt::Read(target) => io::generate_read(self, target),

            Stmt::Write(expr) => io::generate_write(self, expr),

            Stmt::If {
                cond,
                then_body,
                else_body,
            } => control_flow::generate_if(self, cond, then_body, else_body),

            Stmt::While { cond, body } => control_flow::generate_while(self, cond, body),

            Stmt::Return(value) => jumps::generate_return(self, value.as_ref()),

            Stmt::Expr(expr) => misc::generate_expression_stmt(self, expr),

            Stmt::Free(pointer) => misc::generate_free(self, pointer),
        }
    }

    /// Lower a statement list in order
    pub fn generate_block(&mut self, stmts: &[Stmt]) -> Result<Vec<Inst>, CodegenError> {
        let mut code = Vec::new();
        for stmt in stmts {
            code.extend(self.generate(stmt)?);
        }
        Ok(code)
    }

    pub(super) fn create_expression_generator(&mut self) -> ExpressionGenerator<'_> {
        ExpressionGenerator::new(self.temps)
    }
}
