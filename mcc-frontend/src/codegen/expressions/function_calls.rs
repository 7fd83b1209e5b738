//! Function call code generation
//!
//! Arguments travel on the stack. The caller pushes them in order, reserves
//! the return slot, saves `ra`, jumps, then unwinds exactly what it pushed:
//!
//! ```text
//!   pushint a0        ; addi sp, sp, -4     (per argument)
//!   addi sp, sp, -4                         (return slot)
//!   pushint ra        ; addi sp, sp, -4
//!   jr func_f
//!   addi sp, sp, 4    ; popint ra
//!   addi sp, sp, 4    ; popint $tN          (skipped for void)
//!   addi sp, sp, 4*n                        (skipped without arguments)
//! ```

use super::{register_class, ExpressionGenerator};
use crate::ast::Expr;
use crate::codegen::code_object::{CodeObject, CodeValue};
use crate::codegen::errors::CodegenError;
use mcc_codegen::{CallingConvention, Inst, Operand, RegClass};
use mcc_common::{Type, WORD_SIZE};

fn adjust_sp(bytes: i32) -> Inst {
    Inst::Addi(Operand::Sp, Operand::Sp, bytes)
}

pub fn generate_function_call(
    gen: &mut ExpressionGenerator,
    callee: &str,
    args: &[Expr],
    param_types: &[Type],
    return_type: &Type,
) -> Result<CodeObject, CodegenError> {
    let mut code = Vec::new();

    for (index, arg) in args.iter().enumerate() {
        let value = gen.generate_rvalue(arg, "call argument")?;
        let value = match param_types.get(index) {
            Some(param_type) => gen.convert(value, param_type),
            None => value,
        };
        let class = register_class(&value.ty, "call argument")?;
        code.extend(value.code);
        code.push(match class {
            RegClass::Int => Inst::PushInt(value.operand),
            RegClass::Float => Inst::PushFloat(value.operand),
        });
        code.push(adjust_sp(-WORD_SIZE));
    }

    code.push(adjust_sp(-WORD_SIZE));
    code.push(Inst::PushInt(Operand::Ra));
    code.push(adjust_sp(-WORD_SIZE));
    code.push(Inst::Jr(CallingConvention::function_label(callee)));
    code.push(adjust_sp(WORD_SIZE));
    code.push(Inst::PopInt(Operand::Ra));
    code.push(adjust_sp(WORD_SIZE));

    let value = if return_type.is_void() {
        CodeValue::Empty
    } else {
        let class = register_class(return_type, "call result")?;
        let temp = gen.temps.fresh(class);
        code.push(match class {
            RegClass::Int => Inst::PopInt(temp.clone()),
            RegClass::Float => Inst::PopFloat(temp.clone()),
        });
        CodeValue::Value {
            temp,
            ty: return_type.clone(),
        }
    };

    if !args.is_empty() {
        code.push(adjust_sp(WORD_SIZE * args.len() as i32));
    }

    Ok(CodeObject::new(code, value))
}
