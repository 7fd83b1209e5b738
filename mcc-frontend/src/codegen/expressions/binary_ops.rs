//! Arithmetic and comparison code generation

use super::ExpressionGenerator;
use crate::ast::{BinaryOp, CmpOp, Expr};
use crate::codegen::code_object::{CodeObject, CodeValue, RValue};
use crate::codegen::errors::CodegenError;
use mcc_codegen::{Inst, Operand, RegClass};
use mcc_common::Type;

/// Both operands of a binary node, brought to a common class
#[derive(Debug)]
pub struct OperandPair {
    pub code: Vec<Inst>,
    pub left: Operand,
    pub right: Operand,
    /// The promoted left operand's type
    pub ty: Type,
}

impl ExpressionGenerator<'_> {
    /// Concatenate both operands' code and convert the integer side of a
    /// mixed int/float pair with a single `fcvt.s.w`
    pub fn promote(&mut self, left: RValue, right: RValue) -> OperandPair {
        let mut code = left.code;
        code.extend(right.code);

        if left.ty.is_integral() && right.ty.is_float() {
            let (left, _) = self.convert_operand(&mut code, left.operand, &left.ty, &Type::Float);
            OperandPair {
                code,
                left,
                right: right.operand,
                ty: Type::Float,
            }
        } else if left.ty.is_float() && right.ty.is_integral() {
            let (right, _) =
                self.convert_operand(&mut code, right.operand, &right.ty, &Type::Float);
            OperandPair {
                code,
                left: left.operand,
                right,
                ty: left.ty,
            }
        } else {
            OperandPair {
                code,
                left: left.operand,
                right: right.operand,
                ty: left.ty,
            }
        }
    }
}

pub fn generate_binary_operation(
    gen: &mut ExpressionGenerator,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    result_type: &Type,
) -> Result<CodeObject, CodegenError> {
    let left = gen.generate_rvalue(lhs, "arithmetic")?;
    let right = gen.generate_rvalue(rhs, "arithmetic")?;
    let OperandPair {
        mut code,
        left,
        right,
        ty,
    } = gen.promote(left, right);

    if ty.is_float() {
        let dest = gen.temps.fresh(RegClass::Float);
        code.push(match op {
            BinaryOp::Add => Inst::FAdd(dest.clone(), left, right),
            BinaryOp::Sub => Inst::FSub(dest.clone(), left, right),
            BinaryOp::Mul => Inst::FMul(dest.clone(), left, right),
            BinaryOp::Div => Inst::FDiv(dest.clone(), left, right),
        });
        return Ok(CodeObject::value(code, dest, ty));
    }

    let pointer_result = matches!(result_type, Type::Ptr(_));
    if !ty.is_integral() && !pointer_result {
        return Err(CodegenError::UnsupportedType {
            context: "arithmetic",
            ty,
        });
    }

    let dest = gen.temps.fresh(RegClass::Int);
    code.push(match op {
        BinaryOp::Add => Inst::Add(dest.clone(), left, right),
        BinaryOp::Sub => Inst::Sub(dest.clone(), left, right),
        BinaryOp::Mul => Inst::Mul(dest.clone(), left, right),
        BinaryOp::Div => Inst::Div(dest.clone(), left, right),
    });
    let ty = if pointer_result { result_type.clone() } else { ty };
    Ok(CodeObject::value(code, dest, ty))
}

/// Evaluate both sides and defer the branch to the enclosing statement
pub fn generate_condition(
    gen: &mut ExpressionGenerator,
    op: CmpOp,
    lhs: &Expr,
    rhs: &Expr,
) -> Result<CodeObject, CodegenError> {
    let left = gen.generate_rvalue(lhs, "comparison")?;
    let right = gen.generate_rvalue(rhs, "comparison")?;
    let pair = gen.promote(left, right);

    if !pair.ty.is_scalar() {
        return Err(CodegenError::UnsupportedType {
            context: "comparison",
            ty: pair.ty,
        });
    }

    Ok(CodeObject::new(
        pair.code,
        CodeValue::Condition {
            op,
            left: pair.left,
            right: pair.right,
            ty: pair.ty,
        },
    ))
}
