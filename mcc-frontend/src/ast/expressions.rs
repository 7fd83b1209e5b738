//! Expression AST nodes for MicroC
//!
//! Every expression carries the type resolved by the front end. The helper
//! constructors compute that type the way the type checker would, which keeps
//! hand-built trees in tests consistent.

use super::ops::{BinaryOp, CmpOp};
use crate::symbols::Symbol;
use mcc_common::Type;
use serde::{Deserialize, Serialize};

/// Typed expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Integer literal
    IntLit(i64),

    /// Float literal, kept as written
    FloatLit(String),

    /// Variable reference, resolved to its symbol
    Var(Symbol),

    /// Arithmetic
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Arithmetic negation
    Neg(Box<Expr>),

    /// Comparison
    Cond {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Function call; `ty` is the callee's return type
    Call {
        callee: String,
        args: Vec<Expr>,
        param_types: Vec<Type>,
    },

    /// `*expr`
    Deref(Box<Expr>),

    /// `&expr`
    AddrOf(Box<Expr>),

    /// `(ty) expr`; the target type is the node's type
    Cast(Box<Expr>),

    /// `malloc(size)`
    Malloc(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::IntLit(value), Type::Int)
    }

    pub fn float(text: impl Into<String>) -> Self {
        Self::new(ExprKind::FloatLit(text.into()), Type::Float)
    }

    pub fn var(symbol: &Symbol) -> Self {
        Self::new(ExprKind::Var(symbol.clone()), symbol.ty.clone())
    }

    /// Arithmetic; mixed int/float operands produce a float
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        let ty = if lhs.ty.is_float() || rhs.ty.is_float() {
            Type::Float
        } else {
            lhs.ty.clone()
        };
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    pub fn neg(operand: Expr) -> Self {
        let ty = operand.ty.clone();
        Self::new(ExprKind::Neg(Box::new(operand)), ty)
    }

    pub fn cond(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Self::new(
            ExprKind::Cond {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            Type::Int,
        )
    }

    pub fn call(
        callee: impl Into<String>,
        args: Vec<Expr>,
        param_types: Vec<Type>,
        return_type: Type,
    ) -> Self {
        Self::new(
            ExprKind::Call {
                callee: callee.into(),
                args,
                param_types,
            },
            return_type,
        )
    }

    /// `*operand`; an untyped pointer dereferences to int
    pub fn deref(operand: Expr) -> Self {
        let ty = operand.ty.pointee().cloned().unwrap_or(Type::Int);
        Self::new(ExprKind::Deref(Box::new(operand)), ty)
    }

    pub fn addr_of(operand: Expr) -> Self {
        let ty = Type::pointer_to(operand.ty.clone());
        Self::new(ExprKind::AddrOf(Box::new(operand)), ty)
    }

    pub fn cast(target: Type, operand: Expr) -> Self {
        Self::new(ExprKind::Cast(Box::new(operand)), target)
    }

    pub fn malloc(size: Expr) -> Self {
        Self::new(ExprKind::Malloc(Box::new(size)), Type::Infer)
    }
}
