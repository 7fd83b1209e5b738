//! Symbols and scopes
//!
//! Scope management belongs to the front end proper; this module holds just
//! enough of it to give every variable a storage location. Parameters and
//! locals live in the frame, globals and string constants at fixed addresses.

use crate::ast::{Function, GlobalDecl, Stmt};
use mcc_codegen::{CallingConvention, Operand};
use mcc_common::{Type, WORD_SIZE};
use serde::{Deserialize, Serialize};

/// Base address of the global variable area
pub const DEFAULT_GLOBAL_BASE: u32 = 0x2000_0000;

/// Base address of the string constant area
pub const DEFAULT_STRING_BASE: u32 = 0x1000_0000;

/// Where a variable lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Storage {
    /// Frame slot at `offset(fp)`
    Local { offset: i32 },
    /// Absolute address
    Global { address: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub storage: Storage,
}

impl Symbol {
    pub fn local(name: impl Into<String>, ty: Type, offset: i32) -> Self {
        Self {
            name: name.into(),
            ty,
            storage: Storage::Local { offset },
        }
    }

    pub fn global(name: impl Into<String>, ty: Type, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            storage: Storage::Global {
                address: address.into(),
            },
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.storage, Storage::Local { .. })
    }

    /// The symbolic operand naming this variable's home
    pub fn home(&self) -> Operand {
        match &self.storage {
            Storage::Local { offset } => Operand::Local(*offset),
            Storage::Global { address } => Operand::Global {
                name: self.name.clone(),
                address: address.clone(),
            },
        }
    }
}

fn format_address(address: u32) -> String {
    format!("0x{:08x}", address)
}

/// Scope of one function: parameters in the caller's frame, locals in its own
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    params: Vec<Symbol>,
    locals: Vec<Symbol>,
}

impl LocalScope {
    pub fn new(params: &[(&str, Type)]) -> Self {
        let params = params
            .iter()
            .zip(CallingConvention::param_offsets(params.len()))
            .map(|((name, ty), offset)| Symbol::local(*name, ty.clone(), offset))
            .collect();
        Self {
            params,
            locals: Vec::new(),
        }
    }

    /// Declare the next local variable
    pub fn add_local(&mut self, name: &str, ty: Type) -> Symbol {
        let offset = CallingConvention::local_offset(self.locals.len());
        let symbol = Symbol::local(name, ty, offset);
        self.locals.push(symbol.clone());
        symbol
    }

    pub fn param(&self, index: usize) -> Option<&Symbol> {
        self.params.get(index)
    }

    pub fn num_locals(&self) -> usize {
        self.locals.len()
    }

    /// Close the scope into a function definition
    pub fn into_function(
        self,
        name: impl Into<String>,
        return_type: Type,
        body: Vec<Stmt>,
    ) -> Function {
        Function {
            name: name.into(),
            return_type,
            params: self.params,
            locals: self.locals,
            body,
        }
    }
}

/// Program-wide scope of global variables and string constants
#[derive(Debug, Clone)]
pub struct GlobalScope {
    globals: Vec<GlobalDecl>,
    next_variable: u32,
    next_string: u32,
}

impl GlobalScope {
    pub fn new() -> Self {
        Self::with_bases(DEFAULT_GLOBAL_BASE, DEFAULT_STRING_BASE)
    }

    pub fn with_bases(global_base: u32, string_base: u32) -> Self {
        Self {
            globals: Vec::new(),
            next_variable: global_base,
            next_string: string_base,
        }
    }

    /// Declare a one-word global variable
    pub fn add_variable(&mut self, name: &str, ty: Type) -> Symbol {
        let symbol = Symbol::global(name, ty, format_address(self.next_variable));
        self.next_variable += WORD_SIZE as u32;
        self.globals.push(GlobalDecl {
            symbol: symbol.clone(),
            value: None,
        });
        symbol
    }

    /// Declare a string constant; its area is rounded up to whole words
    pub fn add_string(&mut self, name: &str, value: &str) -> Symbol {
        let symbol = Symbol::global(name, Type::Str, format_address(self.next_string));
        let word = WORD_SIZE as u32;
        let bytes = value.len() as u32 + 1;
        self.next_string += bytes.div_ceil(word) * word;
        self.globals.push(GlobalDecl {
            symbol: symbol.clone(),
            value: Some(value.to_string()),
        });
        symbol
    }

    pub fn into_globals(self) -> Vec<GlobalDecl> {
        self.globals
    }
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_scope_offsets() {
        let mut scope = LocalScope::new(&[("a", Type::Int), ("b", Type::Float), ("c", Type::Int)]);
        let x = scope.add_local("x", Type::Int);
        let y = scope.add_local("y", Type::Float);

        assert_eq!(scope.param(0).unwrap().home(), Operand::Local(20));
        assert_eq!(scope.param(2).unwrap().home(), Operand::Local(12));
        assert_eq!(x.home(), Operand::Local(-4));
        assert_eq!(y.home(), Operand::Local(-8));
        assert_eq!(scope.num_locals(), 2);
    }

    #[test]
    fn test_global_addresses() {
        let mut scope = GlobalScope::new();
        let a = scope.add_variable("a", Type::Int);
        let b = scope.add_variable("b", Type::Float);
        let hello = scope.add_string("hello", "hello");
        let bye = scope.add_string("bye", "bye");

        assert_eq!(a.storage, Storage::Global { address: "0x20000000".to_string() });
        assert_eq!(b.storage, Storage::Global { address: "0x20000004".to_string() });
        // "hello" plus its terminator takes two words
        assert_eq!(hello.storage, Storage::Global { address: "0x10000000".to_string() });
        assert_eq!(bye.storage, Storage::Global { address: "0x10000008".to_string() });
        assert!(!a.is_local());

        let globals = scope.into_globals();
        assert_eq!(globals[1].symbol, b);
        assert_eq!(globals[3].value.as_deref(), Some("bye"));
    }
}
