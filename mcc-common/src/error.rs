//! Error handling for the MicroC compiler
//!
//! Every phase reports its own error enum; all of them convert into
//! [`CompilerError`] so the driver has a single type to print.

use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Code generation error in '{function}': {message}")]
    CodegenError { function: String, message: String },

    #[error("Basic block error in '{function}': {message}")]
    BlockError { function: String, message: String },

    #[error("Register allocation error in '{function}': {message}")]
    RegAllocError { function: String, message: String },

    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    /// Create a parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        CompilerError::ParseError {
            message: message.into(),
        }
    }

    /// Create a codegen error attributed to a function
    pub fn codegen_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::CodegenError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a basic block construction error attributed to a function
    pub fn block_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::BlockError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a register allocation error attributed to a function
    pub fn regalloc_error(function: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::RegAllocError {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        CompilerError::ConfigError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}
