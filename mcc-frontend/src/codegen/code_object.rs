//! Code objects: the unit of composition during lowering
//!
//! Every AST node lowers to the instructions that compute it plus a
//! description of what those instructions leave behind.

use crate::ast::CmpOp;
use crate::symbols::Symbol;
use mcc_codegen::{Inst, Operand};
use mcc_common::Type;

/// What a code object's instructions produce
#[derive(Debug, Clone, PartialEq)]
pub enum CodeValue {
    /// L-value whose address has not been computed yet
    Variable(Symbol),

    /// L-value whose address sits in `temp`; `ty` is the pointee type
    Address { temp: Operand, ty: Type },

    /// R-value
    Value { temp: Operand, ty: Type },

    /// Comparison waiting for the enclosing `if`/`while` to pick a branch
    Condition {
        op: CmpOp,
        left: Operand,
        right: Operand,
        ty: Type,
    },

    /// Statements and void calls
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeObject {
    pub code: Vec<Inst>,
    pub value: CodeValue,
}

impl CodeObject {
    pub fn new(code: Vec<Inst>, value: CodeValue) -> Self {
        Self { code, value }
    }

    pub fn empty(code: Vec<Inst>) -> Self {
        Self::new(code, CodeValue::Empty)
    }

    pub fn value(code: Vec<Inst>, temp: Operand, ty: Type) -> Self {
        Self::new(code, CodeValue::Value { temp, ty })
    }

    pub fn variable(symbol: Symbol) -> Self {
        Self::new(Vec::new(), CodeValue::Variable(symbol))
    }

    /// Type of the value or location this object denotes
    pub fn ty(&self) -> Option<&Type> {
        match &self.value {
            CodeValue::Variable(symbol) => Some(&symbol.ty),
            CodeValue::Address { ty, .. }
            | CodeValue::Value { ty, .. }
            | CodeValue::Condition { ty, .. } => Some(ty),
            CodeValue::Empty => None,
        }
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(self.value, CodeValue::Variable(_) | CodeValue::Address { .. })
    }
}

/// A value materialised in an operand
#[derive(Debug, Clone, PartialEq)]
pub struct RValue {
    pub code: Vec<Inst>,
    pub operand: Operand,
    pub ty: Type,
}
