//! MicroC Target Instruction Definitions
//!
//! This module defines the instruction set and operand model for the
//! RISC-V-like target. Lowering produces instructions over symbolic
//! operands; register allocation rewrites them to physical registers.
//!
//! Every instruction exposes its operands through a single role table
//! ([`Inst::operands`] / [`Inst::operands_mut`]) so that liveness analysis and
//! the allocator agree on which operand is defined and which are read.

use mcc_common::TempId;
use std::fmt;

/// Register class of an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegClass {
    Int,
    Float,
}

impl fmt::Display for RegClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegClass::Int => write!(f, "int"),
            RegClass::Float => write!(f, "float"),
        }
    }
}

/// Instruction operand
///
/// Symbolic operands (`Temp`, `Local`, `Global`) carry their storage class
/// explicitly; the allocator decides where to fill from and spill to by
/// matching on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operand {
    /// Symbolic temporary (`$t3`, `$f2`)
    Temp(RegClass, TempId),
    /// Frame-relative variable slot, home at `offset(fp)`
    Local(i32),
    /// Global variable, home at the absolute `address`
    Global { name: String, address: String },
    /// Literal text, materialised with `li` / `fimm.s` on demand
    Imm(String),

    // Special registers
    Zero,
    Sp,
    Fp,
    Ra,

    /// Physical register after allocation (`x5`, `f1`)
    Phys(RegClass, usize),
}

impl Operand {
    /// Build an immediate from anything printable
    pub fn imm(value: impl ToString) -> Self {
        Operand::Imm(value.to_string())
    }

    /// Operands tracked by liveness and the allocator
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Operand::Temp(..) | Operand::Local(_) | Operand::Global { .. })
    }

    /// Operands whose home is memory rather than a frame spill slot
    pub fn is_memory_homed(&self) -> bool {
        matches!(self, Operand::Local(_) | Operand::Global { .. })
    }

    /// Operands that name a fixed register and are never allocated
    pub fn is_fixed(&self) -> bool {
        matches!(
            self,
            Operand::Zero | Operand::Sp | Operand::Fp | Operand::Ra | Operand::Phys(..)
        )
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(RegClass::Int, id) => write!(f, "$t{}", id),
            Operand::Temp(RegClass::Float, id) => write!(f, "$f{}", id),
            Operand::Local(offset) => write!(f, "$l{}", offset),
            Operand::Global { name, .. } => write!(f, "$g{}", name),
            Operand::Imm(text) => write!(f, "{}", text),
            Operand::Zero => write!(f, "x0"),
            Operand::Sp => write!(f, "sp"),
            Operand::Fp => write!(f, "fp"),
            Operand::Ra => write!(f, "ra"),
            Operand::Phys(RegClass::Int, idx) => write!(f, "x{}", idx),
            Operand::Phys(RegClass::Float, idx) => write!(f, "f{}", idx),
        }
    }
}

/// Relation tested by an integer conditional branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchCond {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// MicroC target instructions
///
/// Operand order follows the assembly text: destination first, then sources.
/// Stores list the stored value first, then the base register.
#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    // Integer arithmetic
    Add(Operand, Operand, Operand), // rd = rs1 + rs2
    Sub(Operand, Operand, Operand), // rd = rs1 - rs2
    Mul(Operand, Operand, Operand), // rd = rs1 * rs2
    Div(Operand, Operand, Operand), // rd = rs1 / rs2
    Neg(Operand, Operand),          // rd = -rs
    Addi(Operand, Operand, i32),    // rd = rs + imm
    Li(Operand, String),            // rd = immediate
    La(Operand, String),            // rd = address
    Mv(Operand, Operand),           // rd = rs

    // Float arithmetic
    FAdd(Operand, Operand, Operand),
    FSub(Operand, Operand, Operand),
    FMul(Operand, Operand, Operand),
    FDiv(Operand, Operand, Operand),
    FNeg(Operand, Operand),
    FImm(Operand, String),

    // Float compares write an integer register
    Flt(Operand, Operand, Operand), // rd = fs1 < fs2
    Fle(Operand, Operand, Operand), // rd = fs1 <= fs2
    Feq(Operand, Operand, Operand), // rd = fs1 == fs2

    // Conversions
    Imovf(Operand, Operand), // fd = (float) rs
    Fmovi(Operand, Operand), // rd = (int) fs

    // Memory
    Lw(Operand, Operand, i32),  // rd = mem[base + off]
    Sw(Operand, Operand, i32),  // mem[base + off] = rs
    Flw(Operand, Operand, i32), // fd = mem[base + off]
    Fsw(Operand, Operand, i32), // mem[base + off] = fs

    // Stack pseudo-instructions, rewritten to stores/loads at 0(sp)
    PushInt(Operand),
    PushFloat(Operand),
    PopInt(Operand),
    PopFloat(Operand),

    // Control flow
    Beq(Operand, Operand, String),
    Bne(Operand, Operand, String),
    Blt(Operand, Operand, String),
    Ble(Operand, Operand, String),
    Bgt(Operand, Operand, String),
    Bge(Operand, Operand, String),
    J(String),
    Jr(String), // call: jump and link to a function label
    Ret,

    // Runtime services
    GetI(Operand),
    GetF(Operand),
    PutI(Operand),
    PutF(Operand),
    PutS(Operand),
    Malloc(Operand, Operand), // rd = malloc(rs)
    Free(Operand),
    Halt,

    // Assembly pseudo-instructions
    Label(String),
    Blank,
}

/// Operand roles of one instruction: at most one definition and two uses
#[derive(Debug, PartialEq)]
pub struct Operands<T> {
    pub def: Option<(RegClass, T)>,
    pub uses: [Option<(RegClass, T)>; 2],
}

impl<T> Operands<T> {
    fn new(
        def: Option<(RegClass, T)>,
        use1: Option<(RegClass, T)>,
        use2: Option<(RegClass, T)>,
    ) -> Self {
        Self { def, uses: [use1, use2] }
    }

    fn none() -> Self {
        Self::new(None, None, None)
    }
}

// One table serves both the shared and the mutable view; match ergonomics
// bind the fields as `&Operand` or `&mut Operand` depending on the receiver.
macro_rules! operand_table {
    ($inst:expr) => {{
        use RegClass::{Float as F, Int as I};
        match $inst {
            Inst::Add(d, a, b) | Inst::Sub(d, a, b) | Inst::Mul(d, a, b) | Inst::Div(d, a, b) => {
                Operands::new(Some((I, d)), Some((I, a)), Some((I, b)))
            }
            Inst::Neg(d, a) | Inst::Mv(d, a) | Inst::Addi(d, a, _) | Inst::Malloc(d, a) => {
                Operands::new(Some((I, d)), Some((I, a)), None)
            }
            Inst::Li(d, _) | Inst::La(d, _) | Inst::GetI(d) | Inst::PopInt(d) => {
                Operands::new(Some((I, d)), None, None)
            }
            Inst::FAdd(d, a, b)
            | Inst::FSub(d, a, b)
            | Inst::FMul(d, a, b)
            | Inst::FDiv(d, a, b) => {
                Operands::new(Some((F, d)), Some((F, a)), Some((F, b)))
            }
            Inst::FNeg(d, a) => Operands::new(Some((F, d)), Some((F, a)), None),
            Inst::FImm(d, _) | Inst::GetF(d) | Inst::PopFloat(d) => {
                Operands::new(Some((F, d)), None, None)
            }
            Inst::Flt(d, a, b) | Inst::Fle(d, a, b) | Inst::Feq(d, a, b) => {
                Operands::new(Some((I, d)), Some((F, a)), Some((F, b)))
            }
            Inst::Imovf(d, a) => Operands::new(Some((F, d)), Some((I, a)), None),
            Inst::Fmovi(d, a) => Operands::new(Some((I, d)), Some((F, a)), None),
            Inst::Lw(d, base, _) => Operands::new(Some((I, d)), Some((I, base)), None),
            Inst::Flw(d, base, _) => Operands::new(Some((F, d)), Some((I, base)), None),
            Inst::Sw(s, base, _) => Operands::new(None, Some((I, s)), Some((I, base))),
            Inst::Fsw(s, base, _) => Operands::new(None, Some((F, s)), Some((I, base))),
            Inst::Beq(a, b, _)
            | Inst::Bne(a, b, _)
            | Inst::Blt(a, b, _)
            | Inst::Ble(a, b, _)
            | Inst::Bgt(a, b, _)
            | Inst::Bge(a, b, _) => Operands::new(None, Some((I, a)), Some((I, b))),
            Inst::PushInt(s) | Inst::PutI(s) | Inst::PutS(s) | Inst::Free(s) => {
                Operands::new(None, Some((I, s)), None)
            }
            Inst::PushFloat(s) | Inst::PutF(s) => Operands::new(None, Some((F, s)), None),
            Inst::J(_) | Inst::Jr(_) | Inst::Ret | Inst::Halt | Inst::Label(_) | Inst::Blank => {
                Operands::none()
            }
        }
    }};
}

impl Inst {
    /// Build the conditional branch that jumps to `label` when `a cond b` holds
    pub fn branch(cond: BranchCond, a: Operand, b: Operand, label: impl Into<String>) -> Self {
        let label = label.into();
        match cond {
            BranchCond::Eq => Inst::Beq(a, b, label),
            BranchCond::Ne => Inst::Bne(a, b, label),
            BranchCond::Lt => Inst::Blt(a, b, label),
            BranchCond::Le => Inst::Ble(a, b, label),
            BranchCond::Gt => Inst::Bgt(a, b, label),
            BranchCond::Ge => Inst::Bge(a, b, label),
        }
    }

    /// `lw`/`flw dest, offset(base)` for the given class
    pub fn load(class: RegClass, dest: Operand, base: Operand, offset: i32) -> Self {
        match class {
            RegClass::Int => Inst::Lw(dest, base, offset),
            RegClass::Float => Inst::Flw(dest, base, offset),
        }
    }

    /// `sw`/`fsw value, offset(base)` for the given class
    pub fn store(class: RegClass, value: Operand, base: Operand, offset: i32) -> Self {
        match class {
            RegClass::Int => Inst::Sw(value, base, offset),
            RegClass::Float => Inst::Fsw(value, base, offset),
        }
    }

    /// Operand roles of this instruction
    pub fn operands(&self) -> Operands<&Operand> {
        operand_table!(self)
    }

    /// Mutable operand roles, used to rewrite a copy during allocation
    pub fn operands_mut(&mut self) -> Operands<&mut Operand> {
        operand_table!(self)
    }

    /// The operand written by this instruction, if any
    pub fn def(&self) -> Option<&Operand> {
        self.operands().def.map(|(_, op)| op)
    }

    /// Operands read by this instruction, in order
    pub fn uses(&self) -> Vec<&Operand> {
        self.operands().uses.into_iter().flatten().map(|(_, op)| op).collect()
    }

    /// Label jumped to by a conditional branch or `j`
    pub fn branch_target(&self) -> Option<&str> {
        match self {
            Inst::Beq(_, _, l)
            | Inst::Bne(_, _, l)
            | Inst::Blt(_, _, l)
            | Inst::Ble(_, _, l)
            | Inst::Bgt(_, _, l)
            | Inst::Bge(_, _, l)
            | Inst::J(l) => Some(l),
            _ => None,
        }
    }

    /// Branches and unconditional jumps end a basic block; calls do not
    pub fn is_terminator(&self) -> bool {
        self.branch_target().is_some()
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Inst::Jr(_))
    }

    /// Name of the label this instruction defines
    pub fn label_name(&self) -> Option<&str> {
        match self {
            Inst::Label(name) => Some(name),
            _ => None,
        }
    }

    /// Labels and blank lines carry no opcode and pass through allocation untouched
    pub fn is_pseudo(&self) -> bool {
        matches!(self, Inst::Label(_) | Inst::Blank)
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integer arithmetic
            Inst::Add(d, a, b) => write!(f, "add {}, {}, {}", d, a, b),
            Inst::Sub(d, a, b) => write!(f, "sub {}, {}, {}", d, a, b),
            Inst::Mul(d, a, b) => write!(f, "mul {}, {}, {}", d, a, b),
            Inst::Div(d, a, b) => write!(f, "div {}, {}, {}", d, a, b),
            Inst::Neg(d, a) => write!(f, "neg {}, {}", d, a),
            Inst::Addi(d, a, imm) => write!(f, "addi {}, {}, {}", d, a, imm),
            Inst::Li(d, imm) => write!(f, "li {}, {}", d, imm),
            Inst::La(d, addr) => write!(f, "la {}, {}", d, addr),
            Inst::Mv(d, a) => write!(f, "mv {}, {}", d, a),

            // Float arithmetic
            Inst::FAdd(d, a, b) => write!(f, "fadd.s {}, {}, {}", d, a, b),
            Inst::FSub(d, a, b) => write!(f, "fsub.s {}, {}, {}", d, a, b),
            Inst::FMul(d, a, b) => write!(f, "fmul.s {}, {}, {}", d, a, b),
            Inst::FDiv(d, a, b) => write!(f, "fdiv.s {}, {}, {}", d, a, b),
            Inst::FNeg(d, a) => write!(f, "fneg.s {}, {}", d, a),
            Inst::FImm(d, imm) => write!(f, "fimm.s {}, {}", d, imm),
            Inst::Flt(d, a, b) => write!(f, "flt.s {}, {}, {}", d, a, b),
            Inst::Fle(d, a, b) => write!(f, "fle.s {}, {}, {}", d, a, b),
            Inst::Feq(d, a, b) => write!(f, "feq.s {}, {}, {}", d, a, b),
            Inst::Imovf(d, a) => write!(f, "fcvt.s.w {}, {}", d, a),
            Inst::Fmovi(d, a) => write!(f, "fcvt.w.s {}, {}", d, a),

            // Memory
            Inst::Lw(d, base, off) => write!(f, "lw {}, {}({})", d, off, base),
            Inst::Sw(s, base, off) => write!(f, "sw {}, {}({})", s, off, base),
            Inst::Flw(d, base, off) => write!(f, "flw {}, {}({})", d, off, base),
            Inst::Fsw(s, base, off) => write!(f, "fsw {}, {}({})", s, off, base),
            Inst::PushInt(s) => write!(f, "pushint {}", s),
            Inst::PushFloat(s) => write!(f, "pushfloat {}", s),
            Inst::PopInt(d) => write!(f, "popint {}", d),
            Inst::PopFloat(d) => write!(f, "popfloat {}", d),

            // Control flow
            Inst::Beq(a, b, l) => write!(f, "beq {}, {}, {}", a, b, l),
            Inst::Bne(a, b, l) => write!(f, "bne {}, {}, {}", a, b, l),
            Inst::Blt(a, b, l) => write!(f, "blt {}, {}, {}", a, b, l),
            Inst::Ble(a, b, l) => write!(f, "ble {}, {}, {}", a, b, l),
            Inst::Bgt(a, b, l) => write!(f, "bgt {}, {}, {}", a, b, l),
            Inst::Bge(a, b, l) => write!(f, "bge {}, {}, {}", a, b, l),
            Inst::J(l) => write!(f, "j {}", l),
            Inst::Jr(l) => write!(f, "jr {}", l),
            Inst::Ret => write!(f, "ret"),

            // Runtime services
            Inst::GetI(d) => write!(f, "geti {}", d),
            Inst::GetF(d) => write!(f, "getf {}", d),
            Inst::PutI(s) => write!(f, "puti {}", s),
            Inst::PutF(s) => write!(f, "putf {}", s),
            Inst::PutS(s) => write!(f, "puts {}", s),
            Inst::Malloc(d, s) => write!(f, "malloc {}, {}", d, s),
            Inst::Free(s) => write!(f, "free {}", s),
            Inst::Halt => write!(f, "halt"),

            Inst::Label(l) => write!(f, "{}:", l),
            Inst::Blank => Ok(()),
        }
    }
}
