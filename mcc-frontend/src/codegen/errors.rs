//! Code generation error types

use mcc_common::Type;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodegenError {
    #[error("Unsupported type '{ty}' in {context}")]
    UnsupportedType { context: &'static str, ty: Type },

    #[error("Invalid lvalue in {context}")]
    InvalidLvalue { context: &'static str },

    #[error("Comparison used outside an if or while condition")]
    MisplacedCondition,

    #[error("Expression in {context} produces no value")]
    VoidValue { context: &'static str },

    #[error("String output requires a string variable")]
    StringWithoutVariable,

    #[error("Program does not define a main function")]
    MissingEntryPoint,
}
