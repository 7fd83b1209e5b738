//! MicroC Compiler - Common Types and Utilities
//!
//! This crate contains shared types and error definitions used across
//! all components of the MicroC compiler.

pub mod error;
pub mod types;

pub use error::CompilerError;
pub use types::*;
