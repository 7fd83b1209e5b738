//! Expression code generation modules

mod binary_ops;
mod function_calls;
mod misc_ops;
mod pointer_ops;
mod unary_ops;

pub use binary_ops::{generate_binary_operation, generate_condition, OperandPair};
pub use function_calls::generate_function_call;
pub use misc_ops::{generate_cast, generate_malloc};
pub use pointer_ops::{generate_address_of, generate_dereference};
pub use unary_ops::generate_negation;

use super::code_object::{CodeObject, CodeValue, RValue};
use super::errors::CodegenError;
use super::naming::TempGenerator;
use crate::ast::{Expr, ExprKind};
use crate::symbols::{Storage, Symbol};
use mcc_codegen::{Inst, Operand, RegClass};
use mcc_common::Type;

/// Register class a value of `ty` lives in
pub fn register_class(ty: &Type, context: &'static str) -> Result<RegClass, CodegenError> {
    if ty.is_float() {
        Ok(RegClass::Float)
    } else if ty.is_integral() {
        Ok(RegClass::Int)
    } else {
        Err(CodegenError::UnsupportedType {
            context,
            ty: ty.clone(),
        })
    }
}

/// Expression generator context
pub struct ExpressionGenerator<'a> {
    pub temps: &'a mut TempGenerator,
}

impl<'a> ExpressionGenerator<'a> {
    pub fn new(temps: &'a mut TempGenerator) -> Self {
        Self { temps }
    }

    /// Lower an expression to a code object
    pub fn generate(&mut self, expr: &Expr) -> Result<CodeObject, CodegenError> {
        match &expr.kind {
            ExprKind::IntLit(value) => {
                Ok(CodeObject::value(Vec::new(), Operand::imm(value), Type::Int))
            }

            ExprKind::FloatLit(text) => Ok(CodeObject::value(
                Vec::new(),
                Operand::Imm(text.clone()),
                Type::Float,
            )),

            ExprKind::Var(symbol) => Ok(CodeObject::variable(symbol.clone())),

            ExprKind::Binary { op, lhs, rhs } => {
                generate_binary_operation(self, *op, lhs, rhs, &expr.ty)
            }

            ExprKind::Neg(operand) => generate_negation(self, operand),

            ExprKind::Cond { op, lhs, rhs } => generate_condition(self, *op, lhs, rhs),

            ExprKind::Call {
                callee,
                args,
                param_types,
            } => generate_function_call(self, callee, args, param_types, &expr.ty),

            ExprKind::Deref(operand) => generate_dereference(self, operand, &expr.ty),

            ExprKind::AddrOf(operand) => generate_address_of(self, operand),

            ExprKind::Cast(operand) => generate_cast(self, operand, &expr.ty),

            ExprKind::Malloc(size) => generate_malloc(self, size),
        }
    }

    /// Lower an expression and force it into an operand
    pub fn generate_rvalue(
        &mut self,
        expr: &Expr,
        context: &'static str,
    ) -> Result<RValue, CodegenError> {
        let object = self.generate(expr)?;
        self.rvalify(object, context)
    }

    /// Turn an l-value into an r-value by loading through its address
    pub fn rvalify(
        &mut self,
        object: CodeObject,
        context: &'static str,
    ) -> Result<RValue, CodegenError> {
        let CodeObject { mut code, value } = object;
        match value {
            CodeValue::Variable(symbol) => {
                let address = self.variable_address(&mut code, &symbol);
                let operand = self.load(&mut code, address, &symbol.ty, context)?;
                Ok(RValue {
                    code,
                    operand,
                    ty: symbol.ty,
                })
            }
            CodeValue::Address { temp, ty } => {
                let operand = self.load(&mut code, temp, &ty, context)?;
                Ok(RValue { code, operand, ty })
            }
            CodeValue::Value { temp, ty } => Ok(RValue {
                code,
                operand: temp,
                ty,
            }),
            CodeValue::Condition { .. } => Err(CodegenError::MisplacedCondition),
            CodeValue::Empty => Err(CodegenError::VoidValue { context }),
        }
    }

    /// Materialise a variable's address into a fresh integer temporary
    pub fn variable_address(&mut self, code: &mut Vec<Inst>, symbol: &Symbol) -> Operand {
        let temp = self.temps.fresh(RegClass::Int);
        match &symbol.storage {
            Storage::Local { offset } => code.push(Inst::Addi(temp.clone(), Operand::Fp, *offset)),
            Storage::Global { address } => code.push(Inst::La(temp.clone(), address.clone())),
        }
        temp
    }

    /// Convert between the integer and float classes when they differ
    pub fn convert(&mut self, value: RValue, target: &Type) -> RValue {
        let RValue { mut code, operand, ty } = value;
        let converted = self.convert_operand(&mut code, operand, &ty, target);
        let ty = if converted.1 { target.clone() } else { ty };
        RValue {
            code,
            operand: converted.0,
            ty,
        }
    }

    /// Returns the converted operand and whether a conversion was emitted
    fn convert_operand(
        &mut self,
        code: &mut Vec<Inst>,
        operand: Operand,
        from: &Type,
        to: &Type,
    ) -> (Operand, bool) {
        if to.is_float() && from.is_integral() {
            let temp = self.temps.fresh(RegClass::Float);
            code.push(Inst::Imovf(temp.clone(), operand));
            (temp, true)
        } else if to.is_integral() && from.is_float() {
            let temp = self.temps.fresh(RegClass::Int);
            code.push(Inst::Fmovi(temp.clone(), operand));
            (temp, true)
        } else {
            (operand, false)
        }
    }

    fn load(
        &mut self,
        code: &mut Vec<Inst>,
        address: Operand,
        ty: &Type,
        context: &'static str,
    ) -> Result<Operand, CodegenError> {
        let class = register_class(ty, context)?;
        let dest = self.temps.fresh(class);
        code.push(Inst::load(class, dest.clone(), address, 0));
        Ok(dest)
    }
}
