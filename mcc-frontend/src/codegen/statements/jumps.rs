//! Return statement code generation

use super::StatementGenerator;
use crate::ast::Expr;
use crate::codegen::errors::CodegenError;
use crate::codegen::expressions::register_class;
use mcc_codegen::{CallingConvention, Inst, Operand};

/// Store the value in the return slot and jump to the shared return label
pub fn generate_return(
    gen: &mut StatementGenerator,
    value: Option<&Expr>,
) -> Result<Vec<Inst>, CodegenError> {
    let return_type = gen.return_type;
    let return_label = CallingConvention::return_label(gen.function_name);
    let mut code = Vec::new();

    if let Some(expr) = value {
        let mut exprs = gen.create_expression_generator();
        let value = exprs.generate_rvalue(expr, "return")?;
        let value = if return_type.is_scalar() {
            exprs.convert(value, return_type)
        } else {
            value
        };
        let class = register_class(&value.ty, "return")?;
        code.extend(value.code);
        code.push(Inst::store(
            class,
            value.operand,
            Operand::Fp,
            CallingConvention::RETURN_SLOT_OFFSET,
        ));
    }

    code.push(Inst::J(return_label));
    Ok(code)
}
