//! Miscellaneous statement code generation

use super::StatementGenerator;
use crate::ast::Expr;
use crate::codegen::errors::CodegenError;
use mcc_codegen::Inst;

/// Evaluate for effect; whatever value results is discarded
pub fn generate_expression_stmt(
    gen: &mut StatementGenerator,
    expr: &Expr,
) -> Result<Vec<Inst>, CodegenError> {
    let object = gen.create_expression_generator().generate(expr)?;
    Ok(object.code)
}

pub fn generate_free(
    gen: &mut StatementGenerator,
    pointer: &Expr,
) -> Result<Vec<Inst>, CodegenError> {
    let value = gen.create_expression_generator().generate_rvalue(pointer, "free")?;
    if !value.ty.is_integral() {
        return Err(CodegenError::UnsupportedType {
            context: "free",
            ty: value.ty,
        });
    }

    let mut code = value.code;
    code.push(Inst::Free(value.operand));
    Ok(code)
}
