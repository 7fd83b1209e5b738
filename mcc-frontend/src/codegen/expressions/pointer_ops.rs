//! Pointer code generation: dereference and address-of

use super::ExpressionGenerator;
use crate::ast::Expr;
use crate::codegen::code_object::{CodeObject, CodeValue};
use crate::codegen::errors::CodegenError;
use mcc_common::Type;

/// `*operand`: load the pointer and leave its target as an l-value
pub fn generate_dereference(
    gen: &mut ExpressionGenerator,
    operand: &Expr,
    pointee: &Type,
) -> Result<CodeObject, CodegenError> {
    let pointer = gen.generate_rvalue(operand, "dereference")?;
    if !matches!(pointer.ty, Type::Ptr(_) | Type::Infer) {
        return Err(CodegenError::UnsupportedType {
            context: "dereference",
            ty: pointer.ty,
        });
    }

    Ok(CodeObject::new(
        pointer.code,
        CodeValue::Address {
            temp: pointer.operand,
            ty: pointee.clone(),
        },
    ))
}

/// `&operand`: the address an l-value denotes, as a pointer value
pub fn generate_address_of(
    gen: &mut ExpressionGenerator,
    operand: &Expr,
) -> Result<CodeObject, CodegenError> {
    let CodeObject { mut code, value } = gen.generate(operand)?;
    match value {
        CodeValue::Variable(symbol) => {
            let address = gen.variable_address(&mut code, &symbol);
            Ok(CodeObject::value(code, address, Type::pointer_to(symbol.ty)))
        }
        // Already materialised by a dereference
        CodeValue::Address { temp, ty } => Ok(CodeObject::value(code, temp, Type::pointer_to(ty))),
        _ => Err(CodegenError::InvalidLvalue { context: "address-of" }),
    }
}
