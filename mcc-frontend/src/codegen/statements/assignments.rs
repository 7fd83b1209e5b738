//! Assignment code generation

use super::StatementGenerator;
use crate::ast::Expr;
use crate::codegen::code_object::{CodeObject, CodeValue};
use crate::codegen::errors::CodegenError;
use crate::codegen::expressions::{register_class, ExpressionGenerator};
use crate::symbols::Storage;
use mcc_codegen::{Inst, Operand};

/// Store `value` into the location an l-value denotes
///
/// Bare locals are stored straight to their frame slot; globals need their
/// address materialised first; dereferenced locations already have it.
pub fn store_to(
    gen: &mut ExpressionGenerator,
    code: &mut Vec<Inst>,
    place: CodeValue,
    value: Operand,
    context: &'static str,
) -> Result<(), CodegenError> {
    match place {
        CodeValue::Variable(symbol) => {
            let class = register_class(&symbol.ty, context)?;
            match &symbol.storage {
                Storage::Local { offset } => {
                    code.push(Inst::store(class, value, Operand::Fp, *offset))
                }
                Storage::Global { .. } => {
                    let address = gen.variable_address(code, &symbol);
                    code.push(Inst::store(class, value, address, 0));
                }
            }
        }
        CodeValue::Address { temp, ty } => {
            let class = register_class(&ty, context)?;
            code.push(Inst::store(class, value, temp, 0));
        }
        _ => return Err(CodegenError::InvalidLvalue { context }),
    }
    Ok(())
}

pub fn generate_assignment(
    gen: &mut StatementGenerator,
    target: &Expr,
    value: &Expr,
) -> Result<Vec<Inst>, CodegenError> {
    let mut exprs = gen.create_expression_generator();

    let CodeObject { mut code, value: place } = exprs.generate(target)?;
    let target_type = match &place {
        CodeValue::Variable(symbol) => symbol.ty.clone(),
        CodeValue::Address { ty, .. } => ty.clone(),
        _ => return Err(CodegenError::InvalidLvalue { context: "assignment" }),
    };

    let rhs = exprs.generate_rvalue(value, "assignment")?;
    let rhs = exprs.convert(rhs, &target_type);
    code.extend(rhs.code);

    store_to(&mut exprs, &mut code, place, rhs.operand, "assignment")?;
    Ok(code)
}
