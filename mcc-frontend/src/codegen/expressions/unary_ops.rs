//! Unary operation code generation

use super::{register_class, ExpressionGenerator};
use crate::ast::Expr;
use crate::codegen::code_object::CodeObject;
use crate::codegen::errors::CodegenError;
use mcc_codegen::{Inst, RegClass};

pub fn generate_negation(
    gen: &mut ExpressionGenerator,
    operand: &Expr,
) -> Result<CodeObject, CodegenError> {
    let value = gen.generate_rvalue(operand, "negation")?;
    let class = register_class(&value.ty, "negation")?;
    let dest = gen.temps.fresh(class);

    let mut code = value.code;
    code.push(match class {
        RegClass::Int => Inst::Neg(dest.clone(), value.operand),
        RegClass::Float => Inst::FNeg(dest.clone(), value.operand),
    });

    Ok(CodeObject::value(code, dest, value.ty))
}
