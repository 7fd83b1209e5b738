//! Control flow statement code generation (if, while)
//!
//! Both statements branch *away* from the guarded body, so the test emitted
//! is the reversed comparison. Float comparisons have no branch form: a
//! `flt.s`/`fle.s`/`feq.s` writes a flag that is branched on against `x0`.

use super::StatementGenerator;
use crate::ast::{CmpOp, Expr, Stmt};
use crate::codegen::code_object::{CodeObject, CodeValue};
use crate::codegen::errors::CodegenError;
use crate::codegen::expressions::ExpressionGenerator;
use mcc_codegen::{Inst, Operand, RegClass};
use mcc_common::Type;

/// Emit `condition`'s code followed by a branch to `label` taken when the
/// condition is false
///
/// A plain integer value is tested against zero.
pub fn branch_unless(
    gen: &mut ExpressionGenerator,
    condition: CodeObject,
    label: &str,
) -> Result<Vec<Inst>, CodegenError> {
    let CodeObject { mut code, value } = condition;

    let (op, left, right, ty) = match value {
        CodeValue::Condition { op, left, right, ty } => (op, left, right, ty),
        other => {
            let object = CodeObject::new(std::mem::take(&mut code), other);
            let value = gen.rvalify(object, "condition")?;
            if !value.ty.is_integral() {
                return Err(CodegenError::UnsupportedType {
                    context: "condition",
                    ty: value.ty,
                });
            }
            code = value.code;
            (CmpOp::Ne, value.operand, Operand::Zero, Type::Int)
        }
    };

    let reversed = op.reversed();
    if ty.is_float() {
        let flag = gen.temps.fresh(RegClass::Int);
        // (compare, branch when the flag is set)
        let (compare, when_set): (fn(Operand, Operand, Operand) -> Inst, bool) = match reversed {
            CmpOp::Le => (Inst::Fle, true),
            CmpOp::Lt => (Inst::Flt, true),
            CmpOp::Ge => (Inst::Flt, false),
            CmpOp::Gt => (Inst::Fle, false),
            CmpOp::Eq => (Inst::Feq, true),
            CmpOp::Ne => (Inst::Feq, false),
        };
        code.push(compare(flag.clone(), left, right));
        code.push(if when_set {
            Inst::Bne(flag, Operand::Zero, label.to_string())
        } else {
            Inst::Beq(flag, Operand::Zero, label.to_string())
        });
    } else if ty.is_integral() {
        code.push(Inst::branch(reversed.into(), left, right, label));
    } else {
        return Err(CodegenError::UnsupportedType { context: "condition", ty });
    }

    Ok(code)
}

pub fn generate_if(
    gen: &mut StatementGenerator,
    condition: &Expr,
    then_body: &[Stmt],
    else_body: &[Stmt],
) -> Result<Vec<Inst>, CodegenError> {
    let condition = gen.create_expression_generator().generate(condition)?;
    let then_code = gen.generate_block(then_body)?;
    let else_code = gen.generate_block(else_body)?;

    let else_label = gen.labels.else_label();
    let out_label = gen.labels.out_label();

    let mut exprs = gen.create_expression_generator();
    let mut code;
    if else_code.is_empty() {
        code = branch_unless(&mut exprs, condition, &out_label)?;
        code.extend(then_code);
    } else {
        code = branch_unless(&mut exprs, condition, &else_label)?;
        code.extend(then_code);
        code.push(Inst::J(out_label.clone()));
        code.push(Inst::Label(else_label));
        code.extend(else_code);
    }
    code.push(Inst::Label(out_label));

    Ok(code)
}

pub fn generate_while(
    gen: &mut StatementGenerator,
    condition: &Expr,
    body: &[Stmt],
) -> Result<Vec<Inst>, CodegenError> {
    let condition = gen.create_expression_generator().generate(condition)?;
    let body_code = gen.generate_block(body)?;

    let loop_label = gen.labels.loop_label();
    let out_label = gen.labels.out_label();

    let mut code = vec![Inst::Label(loop_label.clone())];
    code.extend(branch_unless(&mut gen.create_expression_generator(), condition, &out_label)?);
    code.extend(body_code);
    code.push(Inst::J(loop_label));
    code.push(Inst::Label(out_label));

    Ok(code)
}
