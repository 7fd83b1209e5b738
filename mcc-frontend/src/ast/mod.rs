//! Typed Abstract Syntax Tree for MicroC
//!
//! This is the interface between an external parser/type checker and the
//! lowering pass. Nodes already carry resolved types and variable references
//! already carry their symbols. The tree round-trips through JSON so a front
//! end written elsewhere can hand programs to the compiler.

pub mod expressions;
pub mod ops;
pub mod statements;

pub use expressions::{Expr, ExprKind};
pub use ops::{BinaryOp, CmpOp};
pub use statements::Stmt;

use crate::symbols::Symbol;
use mcc_common::{CompilerError, Type};
use serde::{Deserialize, Serialize};

/// A global variable or string constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub symbol: Symbol,
    /// Contents of a string constant
    #[serde(default)]
    pub value: Option<String>,
}

/// A function definition with its resolved scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<Symbol>,
    #[serde(default)]
    pub locals: Vec<Symbol>,
    pub body: Vec<Stmt>,
}

impl Function {
    /// Number of local variable slots (parameters live in the caller's frame)
    pub fn num_locals(&self) -> usize {
        self.locals.len()
    }

    /// Every variable visible in the function's own scope
    pub fn scope_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.params.iter().chain(self.locals.iter())
    }
}

/// A whole translation unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub globals: Vec<GlobalDecl>,
    pub functions: Vec<Function>,
}

impl Program {
    /// Parse a typed program from its JSON form
    pub fn from_json(text: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(text).map_err(|e| CompilerError::parse_error(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CompilerError> {
        serde_json::to_string_pretty(self).map_err(|e| CompilerError::parse_error(e.to_string()))
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{GlobalScope, LocalScope};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_program_json_round_trip() {
        let mut globals = GlobalScope::new();
        let count = globals.add_variable("count", Type::Int);
        globals.add_string("greeting", "hello");

        let mut scope = LocalScope::new(&[]);
        let x = scope.add_local("x", Type::Float);
        let main = scope.into_function(
            "main",
            Type::Int,
            vec![
                Stmt::Assign {
                    target: Expr::var(&x),
                    value: Expr::binary(BinaryOp::Add, Expr::var(&count), Expr::float("1.5")),
                },
                Stmt::Return(Some(Expr::int(0))),
            ],
        );

        let program = Program {
            globals: globals.into_globals(),
            functions: vec![main],
        };

        let json = program.to_json().unwrap();
        let parsed = Program::from_json(&json).unwrap();
        assert_eq!(parsed, program);
        assert_eq!(parsed.function("main").unwrap().num_locals(), 1);
    }

    #[test]
    fn test_operator_spelling_in_json() {
        let json = r#"{
            "functions": [{
                "name": "main",
                "return_type": "Void",
                "body": [{
                    "If": {
                        "cond": {
                            "kind": {"Cond": {
                                "op": "<=",
                                "lhs": {"kind": {"IntLit": 1}, "ty": "Int"},
                                "rhs": {"kind": {"IntLit": 2}, "ty": "Int"}
                            }},
                            "ty": "Int"
                        },
                        "then_body": [{"Return": null}]
                    }
                }]
            }]
        }"#;

        let program = Program::from_json(json).unwrap();
        let main = &program.functions[0];
        match &main.body[0] {
            Stmt::If { cond, else_body, .. } => {
                assert!(matches!(cond.kind, ExprKind::Cond { op: CmpOp::Le, .. }));
                assert!(else_body.is_empty());
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = Program::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CompilerError::ParseError { .. }));
    }
}
