//! Common types used throughout the compiler
//!
//! This module defines the semantic types that flow from the typed AST
//! through lowering and into register allocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label identifier for code generation
pub type LabelId = u32;

/// Temporary identifier; numbering restarts at 1 in every function
pub type TempId = u32;

/// Size of every scalar slot (int, float, pointer) in bytes
pub const WORD_SIZE: i32 = 4;

/// Resolved semantic type of an expression or symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    /// String constants; only ever referenced through a global variable
    Str,
    Void,
    /// Pointer to the wrapped type
    Ptr(Box<Type>),
    /// Untyped pointer produced by `malloc`; the consumer decides the pointee
    Infer,
}

impl Type {
    /// Build a pointer to `inner`
    pub fn pointer_to(inner: Type) -> Self {
        Type::Ptr(Box::new(inner))
    }

    /// The pointee type, if this is a pointer
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float)
    }

    /// Types whose values live in integer registers
    pub fn is_integral(&self) -> bool {
        matches!(self, Type::Int | Type::Ptr(_) | Type::Infer)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Whether a value of this type can sit in a register at all
    pub fn is_scalar(&self) -> bool {
        self.is_integral() || self.is_float()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Ptr(inner) => write!(f, "{}*", inner),
            Type::Infer => write!(f, "<inferred>*"),
        }
    }
}
