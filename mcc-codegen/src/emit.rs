//! Assembly text emission
//!
//! Labels start at column zero, instructions are indented, blank pseudo
//! instructions become empty lines. String constants follow the code in a
//! `.data` section.

use crate::asm::Inst;
use std::fmt::Write;

/// Render a single instruction as one line of assembly (without newline)
pub fn emit_line(inst: &Inst) -> String {
    match inst {
        Inst::Label(_) | Inst::Blank => inst.to_string(),
        _ => format!("    {}", inst),
    }
}

/// Render a full instruction stream
pub fn emit_instructions(insts: &[Inst]) -> String {
    let mut out = String::new();
    for inst in insts {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{}", emit_line(inst));
    }
    out
}

/// A string constant placed at a fixed address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringConstant {
    pub name: String,
    pub address: String,
    pub value: String,
}

/// Render the data section holding every string constant
///
/// Each constant gets its name as a label, an `.org` pinning it to its
/// address and its NUL-terminated contents. No constants, no section.
pub fn emit_data_section(strings: &[StringConstant]) -> String {
    let mut out = String::new();
    if strings.is_empty() {
        return out;
    }

    let _ = writeln!(out, "    .data");
    for constant in strings {
        let _ = writeln!(out, "{}:", constant.name);
        let _ = writeln!(out, "    .org {}", constant.address);
        let _ = writeln!(out, "    .string \"{}\"", constant.value.escape_default());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Operand;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emit_listing() {
        let insts = vec![
            Inst::Label("func_main".to_string()),
            Inst::Li(Operand::Phys(crate::RegClass::Int, 4), "7".to_string()),
            Inst::Ret,
            Inst::Blank,
        ];
        assert_eq!(
            emit_instructions(&insts),
            "func_main:\n    li x4, 7\n    ret\n\n"
        );
    }

    #[test]
    fn test_data_section() {
        let strings = vec![
            StringConstant {
                name: "hello".to_string(),
                address: "0x10000000".to_string(),
                value: "hello".to_string(),
            },
            StringConstant {
                name: "line".to_string(),
                address: "0x10000008".to_string(),
                value: "say \"hi\"\n".to_string(),
            },
        ];
        let expected = [
            "    .data",
            "hello:",
            "    .org 0x10000000",
            "    .string \"hello\"",
            "line:",
            "    .org 0x10000008",
            r#"    .string "say \"hi\"\n""#,
        ];
        assert_eq!(emit_data_section(&strings), expected.join("\n") + "\n");
        assert_eq!(emit_data_section(&[]), "");
    }
}
