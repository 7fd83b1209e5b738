//! Console input and output statements

use super::{store_to, StatementGenerator};
use crate::ast::Expr;
use crate::codegen::code_object::{CodeObject, CodeValue};
use crate::codegen::errors::CodegenError;
use crate::codegen::expressions::register_class;
use mcc_codegen::{Inst, RegClass};
use mcc_common::Type;

/// `read(target)`: `geti`/`getf` into a fresh temporary, then store it
pub fn generate_read(
    gen: &mut StatementGenerator,
    target: &Expr,
) -> Result<Vec<Inst>, CodegenError> {
    let mut exprs = gen.create_expression_generator();

    let place = exprs.generate(target)?;
    if !place.is_lvalue() {
        return Err(CodegenError::InvalidLvalue { context: "read" });
    }
    let ty = place.ty().cloned().unwrap_or(Type::Void);
    let CodeObject { mut code, value: place } = place;

    let temp = match ty {
        Type::Int => {
            let temp = exprs.temps.fresh(RegClass::Int);
            code.push(Inst::GetI(temp.clone()));
            temp
        }
        Type::Float => {
            let temp = exprs.temps.fresh(RegClass::Float);
            code.push(Inst::GetF(temp.clone()));
            temp
        }
        ty => return Err(CodegenError::UnsupportedType { context: "read", ty }),
    };

    store_to(&mut exprs, &mut code, place, temp, "read")?;
    Ok(code)
}

/// `print(expr)`: strings by address with `puts`, scalars by value
pub fn generate_write(
    gen: &mut StatementGenerator,
    expr: &Expr,
) -> Result<Vec<Inst>, CodegenError> {
    let mut exprs = gen.create_expression_generator();
    let object = exprs.generate(expr)?;

    if object.ty() == Some(&Type::Str) {
        let CodeObject { mut code, value } = object;
        let CodeValue::Variable(symbol) = value else {
            return Err(CodegenError::StringWithoutVariable);
        };
        let address = exprs.variable_address(&mut code, &symbol);
        code.push(Inst::PutS(address));
        return Ok(code);
    }

    let value = exprs.rvalify(object, "print")?;
    let class = register_class(&value.ty, "print")?;
    let mut code = value.code;
    code.push(match class {
        RegClass::Int => Inst::PutI(value.operand),
        RegClass::Float => Inst::PutF(value.operand),
    });
    Ok(code)
}
