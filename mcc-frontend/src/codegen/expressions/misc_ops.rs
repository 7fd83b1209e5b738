//! Miscellaneous expression code generation: casts and heap allocation

use super::ExpressionGenerator;
use crate::ast::Expr;
use crate::codegen::code_object::CodeObject;
use crate::codegen::errors::CodegenError;
use mcc_codegen::{Inst, RegClass};
use mcc_common::Type;

pub fn generate_cast(
    gen: &mut ExpressionGenerator,
    operand: &Expr,
    target: &Type,
) -> Result<CodeObject, CodegenError> {
    let value = gen.generate_rvalue(operand, "cast")?;
    if !target.is_scalar() {
        return Err(CodegenError::UnsupportedType {
            context: "cast",
            ty: target.clone(),
        });
    }
    let value = gen.convert(value, target);
    Ok(CodeObject::value(value.code, value.operand, target.clone()))
}

/// `malloc(size)` yields an untyped pointer
pub fn generate_malloc(
    gen: &mut ExpressionGenerator,
    size: &Expr,
) -> Result<CodeObject, CodegenError> {
    let size = gen.generate_rvalue(size, "malloc")?;
    if !size.ty.is_integral() {
        return Err(CodegenError::UnsupportedType {
            context: "malloc",
            ty: size.ty,
        });
    }

    let dest = gen.temps.fresh(RegClass::Int);
    let mut code = size.code;
    code.push(Inst::Malloc(dest.clone(), size.operand));
    Ok(CodeObject::value(code, dest, Type::Infer))
}
