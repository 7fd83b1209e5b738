//! Basic block splitting
//!
//! A block starts at the first instruction, at every label, and right after
//! every conditional branch or `j`. Calls (`jr`) return to the next
//! instruction and do not end a block.

use log::trace;
use mcc_codegen::Inst;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    #[error("Jump to undefined label '{0}'")]
    UnknownLabel(String),

    #[error("Label '{0}' is defined more than once")]
    DuplicateLabel(String),
}

/// A maximal straight-line run of instructions
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Index of the leader in the function body
    pub start: usize,
    pub instructions: Vec<Inst>,
}

impl BasicBlock {
    /// The label this block starts with, if any
    pub fn label(&self) -> Option<&str> {
        self.instructions.first().and_then(Inst::label_name)
    }

    /// Whether control leaves the block through a branch or jump
    pub fn ends_in_jump(&self) -> bool {
        self.instructions.last().is_some_and(Inst::is_terminator)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Check that labels are unique and every jump lands on one of them
fn check_labels(body: &[Inst]) -> Result<(), BlockError> {
    let mut labels = HashSet::new();
    for name in body.iter().filter_map(Inst::label_name) {
        if !labels.insert(name) {
            return Err(BlockError::DuplicateLabel(name.to_string()));
        }
    }

    match body
        .iter()
        .filter_map(Inst::branch_target)
        .find(|target| !labels.contains(target))
    {
        Some(target) => Err(BlockError::UnknownLabel(target.to_string())),
        None => Ok(()),
    }
}

/// Split a function body into basic blocks, in order
pub fn split_blocks(body: &[Inst]) -> Result<Vec<BasicBlock>, BlockError> {
    check_labels(body)?;

    let mut leaders = BTreeSet::new();
    if !body.is_empty() {
        leaders.insert(0);
    }
    for (index, inst) in body.iter().enumerate() {
        if inst.label_name().is_some() {
            leaders.insert(index);
        }
        if inst.is_terminator() && index + 1 < body.len() {
            leaders.insert(index + 1);
        }
    }

    let starts: Vec<usize> = leaders.into_iter().collect();
    let blocks: Vec<BasicBlock> = starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(body.len());
            BasicBlock {
                start,
                instructions: body[start..end].to_vec(),
            }
        })
        .collect();

    trace!("split {} instructions into {} blocks", body.len(), blocks.len());
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_codegen::{Operand, RegClass};
    use pretty_assertions::assert_eq;

    fn t(id: u32) -> Operand {
        Operand::Temp(RegClass::Int, id)
    }

    fn label(name: &str) -> Inst {
        Inst::Label(name.to_string())
    }

    fn sample() -> Vec<Inst> {
        vec![
            label("loop_1"),
            Inst::Lw(t(1), Operand::Fp, -4),
            Inst::Bge(t(1), Operand::imm(10), "out_1".to_string()),
            Inst::Jr("func_f".to_string()),
            Inst::Addi(t(2), t(1), 1),
            Inst::J("loop_1".to_string()),
            label("out_1"),
            label("func_ret_main"),
        ]
    }

    #[test]
    fn test_leaders() {
        let blocks = split_blocks(&sample()).unwrap();
        let starts: Vec<usize> = blocks.iter().map(|b| b.start).collect();
        // The call does not split; the two adjacent labels do
        assert_eq!(starts, vec![0, 3, 6, 7]);
        assert_eq!(blocks[0].label(), Some("loop_1"));
        assert!(blocks[0].ends_in_jump());
        assert!(blocks[1].ends_in_jump());
        assert!(!blocks[2].ends_in_jump());
        assert_eq!(blocks[1].label(), None);
    }

    #[test]
    fn test_blocks_concatenate_to_input() {
        let body = sample();
        let blocks = split_blocks(&body).unwrap();
        let joined: Vec<Inst> = blocks.into_iter().flat_map(|b| b.instructions).collect();
        assert_eq!(joined, body);
    }

    #[test]
    fn test_straight_line_code_is_one_block() {
        let body = vec![Inst::Li(t(1), "1".to_string()), Inst::PutI(t(1))];
        let blocks = split_blocks(&body).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 2);
        assert!(split_blocks(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_label_errors() {
        let missing = vec![Inst::J("nowhere".to_string())];
        assert_eq!(
            split_blocks(&missing),
            Err(BlockError::UnknownLabel("nowhere".to_string()))
        );

        let twice = vec![label("out_1"), label("out_1")];
        assert_eq!(
            split_blocks(&twice),
            Err(BlockError::DuplicateLabel("out_1".to_string()))
        );
    }
}
