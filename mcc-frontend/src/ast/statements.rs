//! Statement AST nodes for MicroC

use super::expressions::Expr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `target = value;` where target is a variable or a dereference
    Assign { target: Expr, value: Expr },

    /// `read(target);`
    Read(Expr),

    /// `print(expr);`
    Write(Expr),

    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        #[serde(default)]
        else_body: Vec<Stmt>,
    },

    While { cond: Expr, body: Vec<Stmt> },

    Return(Option<Expr>),

    /// Expression evaluated for its effects (calls)
    Expr(Expr),

    /// `free(ptr);`
    Free(Expr),
}
