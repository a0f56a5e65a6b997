use crate::format::{FpType, RType, TrapType};
use crate::label::Label;

/// 16-bit immediate of an I-type record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imm {
    Value(i32),
    /// Word displacement from the delay slot to the label.
    Branch(Label),
    /// Upper half of the label's address (`lui`).
    High(Label),
    /// Lower half of the label's address (`ori`).
    Low(Label),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTarget {
    /// Already validated 26-bit word index.
    Index(u32),
    Label(Label),
}

/// One entry of the emission log. Fields that depend on labels stay symbolic
/// until finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    R(RType),
    I { opcode: u32, rs: u32, rt: u32, imm: Imm },
    J { opcode: u32, target: JumpTarget },
    Trap(TrapType),
    Fp(FpType),
    Data(u32),
    Nop,
}

impl Instruction {
    /// Label this record waits on, if any.
    pub fn label(&self) -> Option<Label> {
        match self {
            Instruction::I {
                imm: Imm::Branch(l) | Imm::High(l) | Imm::Low(l),
                ..
            } => Some(*l),
            Instruction::J {
                target: JumpTarget::Label(l),
                ..
            } => Some(*l),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Virtual PC the instruction occupies.
    pub pc: u32,
    pub instr: Instruction,
}
