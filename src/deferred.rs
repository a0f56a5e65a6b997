//! Second assembly phase: turns symbolic fields into numbers once every label
//! has an address. Nothing here touches the emission log, so each step can be
//! driven directly from a [`LabelTable`].

use crate::error::{AsmError, Field, Result};
use crate::format::{IType, JType, Word};
use crate::label::LabelTable;
use crate::record::{Imm, Instruction, JumpTarget, Record};

const SEGMENT_MASK: u32 = 0xF000_0000;

/// Word displacement of a branch at `pc` to `target`, measured from the delay
/// slot (`pc + 4`). The byte distance has to be a multiple of four.
pub fn branch_offset(target: u32, pc: u32) -> Result<i32> {
    let delta = target.wrapping_sub(pc).wrapping_sub(4) as i32;
    if delta & 3 != 0 {
        return Err(AsmError::EncodingRange {
            field: Field::BranchOffset,
            value: delta as i64,
        });
    }
    let offset = delta >> 2;
    if offset < i16::MIN as i32 || offset > i16::MAX as i32 {
        return Err(AsmError::EncodingRange {
            field: Field::BranchOffset,
            value: offset as i64,
        });
    }
    Ok(offset)
}

/// 26-bit index for a `j`/`jal` at `pc`. The target has to live in the same
/// 256 MiB segment as the delay slot and be word aligned.
pub fn jump_index(target: u32, pc: u32) -> Result<u32> {
    let slot = pc.wrapping_add(4);
    if target & SEGMENT_MASK != slot & SEGMENT_MASK {
        return Err(AsmError::JumpSegmentMismatch { target, pc });
    }
    if target & 0b11 != 0 {
        return Err(AsmError::JumpAlignment { target });
    }
    Ok((target & !SEGMENT_MASK) >> 2)
}

pub fn resolve_imm(imm: Imm, pc: u32, labels: &LabelTable) -> Result<i32> {
    match imm {
        Imm::Value(v) => Ok(v),
        Imm::Branch(label) => branch_offset(labels.address(label)?, pc),
        Imm::High(label) => Ok((labels.address(label)? >> 16) as i32),
        Imm::Low(label) => Ok((labels.address(label)? & 0xFFFF) as i32),
    }
}

pub fn resolve_jump(target: JumpTarget, pc: u32, labels: &LabelTable) -> Result<u32> {
    match target {
        JumpTarget::Index(index) => Ok(index),
        JumpTarget::Label(label) => jump_index(labels.address(label)?, pc),
    }
}

impl Record {
    /// Evaluates every deferred field, producing a word ready for packing.
    pub fn resolve(&self, labels: &LabelTable) -> Result<Word> {
        Ok(match self.instr {
            Instruction::R(r) => Word::R(r),
            Instruction::I { opcode, rs, rt, imm } => Word::I(IType {
                opcode,
                rs,
                rt,
                imm: resolve_imm(imm, self.pc, labels)?,
            }),
            Instruction::J { opcode, target } => Word::J(JType {
                opcode,
                index: resolve_jump(target, self.pc, labels)?,
            }),
            Instruction::Trap(t) => Word::Trap(t),
            Instruction::Fp(f) => Word::Fp(f),
            Instruction::Data(w) => Word::Data(w),
            Instruction::Nop => Word::Nop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn offset_counts_from_delay_slot() {
        assert_eq!(branch_offset(8, 0), Ok(1));
        assert_eq!(branch_offset(4, 0), Ok(0));
        assert_eq!(branch_offset(0, 0), Ok(-1));
        assert_eq!(branch_offset(0x100, 0x200), Ok(-0x41));
    }

    #[test]
    fn offset_range() {
        assert_eq!(branch_offset(4 + 0x7FFF * 4, 0), Ok(0x7FFF));
        assert_eq!(
            branch_offset(4 + 0x8000 * 4, 0),
            Err(AsmError::EncodingRange {
                field: Field::BranchOffset,
                value: 0x8000
            })
        );
        let pc = 0x0010_0000;
        assert_eq!(branch_offset(pc + 4 - 0x8000 * 4, pc), Ok(-0x8000));
        assert!(branch_offset(pc - 0x8000 * 4, pc).is_err());
    }

    #[test]
    fn misaligned_target_is_an_error() {
        let mut labels = LabelTable::new();
        let l = labels.create();
        labels.bind(l, 6).unwrap();
        assert_eq!(
            resolve_imm(Imm::Branch(l), 0, &labels),
            Err(AsmError::EncodingRange {
                field: Field::BranchOffset,
                value: 2
            })
        );
        assert!(branch_offset(0x11, 0x8).is_err());
    }

    #[test]
    fn offset_wraps_around_address_space() {
        assert_eq!(branch_offset(0x0000_0004, 0xFFFF_FFFC), Ok(1));
    }

    #[test]
    fn jump_checks() {
        let pc = 0x0896_D6E4;
        assert_eq!(jump_index(0x08FD_23A0, pc), Ok(0x023F_48E8));
        assert_eq!(
            jump_index(0x08FD_23A1, pc),
            Err(AsmError::JumpAlignment { target: 0x08FD_23A1 })
        );
        assert_eq!(
            jump_index(0xF8FD_23A0, pc),
            Err(AsmError::JumpSegmentMismatch { target: 0xF8FD_23A0, pc })
        );
    }

    #[test]
    fn jump_segment_uses_delay_slot() {
        // the delay slot of a jump at the end of a segment is already in the next one
        assert!(jump_index(0x1000_0000, 0x0FFF_FFFC).is_ok());
        assert!(jump_index(0x0000_0000, 0x0FFF_FFFC).is_err());
    }

    #[test]
    fn resolve_against_table() {
        let mut labels = LabelTable::new();
        let l = labels.create();
        labels.bind(l, 0x1234_5678).unwrap();
        assert_eq!(resolve_imm(Imm::High(l), 0, &labels), Ok(0x1234));
        assert_eq!(resolve_imm(Imm::Low(l), 0, &labels), Ok(0x5678));
        assert_eq!(resolve_imm(Imm::Value(-7), 0, &labels), Ok(-7));
        assert_eq!(
            resolve_jump(JumpTarget::Label(l), 0x1000_0000, &labels),
            Ok(0x0234_5678 >> 2)
        );
    }

    #[test]
    fn unresolved_label_fails_resolve() {
        let mut labels = LabelTable::new();
        let l = labels.create();
        let rec = Record {
            pc: 0,
            instr: Instruction::I {
                opcode: 4,
                rs: 0,
                rt: 0,
                imm: Imm::Branch(l),
            },
        };
        assert_eq!(rec.resolve(&labels), Err(AsmError::LabelNotAssigned { label: l }));
        labels.bind(l, 12).unwrap();
        assert_eq!(
            rec.resolve(&labels),
            Ok(Word::I(IType {
                opcode: 4,
                rs: 0,
                rt: 0,
                imm: 2
            }))
        );
    }
}
