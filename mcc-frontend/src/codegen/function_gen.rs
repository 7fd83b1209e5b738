//! Per-function lowering

use super::naming::{LabelGenerator, TempGenerator};
use super::statements::StatementGenerator;
use super::LoweredFunction;
use crate::ast::Function;
use crate::symbols::Symbol;
use log::{debug, trace};
use mcc_codegen::{CallingConvention, Inst};
use mcc_common::CompilerError;

/// Lower one function body; temporaries restart at 1, labels do not
pub(super) fn generate_function(
    labels: &mut LabelGenerator,
    function: &Function,
) -> Result<LoweredFunction, CompilerError> {
    debug!(
        "Lowering function '{}' ({} params, {} locals)",
        function.name,
        function.params.len(),
        function.num_locals()
    );

    let mut temps = TempGenerator::new();
    let mut gen = StatementGenerator {
        labels,
        temps: &mut temps,
        function_name: &function.name,
        return_type: &function.return_type,
    };

    let mut body = gen
        .generate_block(&function.body)
        .map_err(|e| CompilerError::codegen_error(&function.name, e.to_string()))?;
    body.push(Inst::Label(CallingConvention::return_label(&function.name)));

    trace!(
        "  '{}': {} instructions, {} int temps, {} float temps",
        function.name,
        body.len(),
        temps.int_count(),
        temps.float_count()
    );

    Ok(LoweredFunction {
        name: function.name.clone(),
        return_type: function.return_type.clone(),
        body,
        num_locals: function.num_locals(),
        int_temps: temps.int_count(),
        float_temps: temps.float_count(),
        scope_homes: function.scope_symbols().map(Symbol::home).collect(),
    })
}
