use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::deferred::jump_index;
use crate::error::{AsmError, Result};
use crate::format::RType;
use crate::label::{Label, LabelTable};
use crate::output::{Endianness, Program};
use crate::record::{Imm, Instruction, JumpTarget, Record};
use crate::reg::Reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Address of the first emitted instruction.
    pub start_pc: u32,
    pub endianness: Endianness,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            start_pc: 0,
            endianness: Endianness::Little,
        }
    }
}

/// An assembly session.
///
/// Emission calls append records to the log and advance the virtual PC by one
/// word. Branch targets are labels; their displacement is only computed by
/// [`finalize`](Assembler::finalize), so a branch may refer to a label placed
/// later in the program.
#[derive(Debug, Clone)]
pub struct Assembler {
    cfg: AssemblerConfig,
    virtual_pc: u32,
    log: Vec<Record>,
    labels: LabelTable,
}

impl Assembler {
    pub fn new(start_pc: u32, endianness: Endianness) -> Self {
        Self::with_config(AssemblerConfig {
            start_pc,
            endianness,
        })
    }

    pub fn with_config(cfg: AssemblerConfig) -> Self {
        Self {
            cfg,
            virtual_pc: cfg.start_pc,
            log: Vec::new(),
            labels: LabelTable::new(),
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.cfg.endianness
    }

    /// Address the next emitted instruction will occupy.
    pub fn virtual_pc(&self) -> u32 {
        self.virtual_pc
    }

    pub fn records(&self) -> &[Record] {
        &self.log
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.create()
    }

    pub fn new_named_label(&mut self, name: impl Into<String>) -> Label {
        self.labels.create_named(name)
    }

    /// Binds `label` to the current virtual PC.
    pub fn place_label(&mut self, label: Label) -> Result<()> {
        self.labels.bind(label, self.virtual_pc as i64)?;
        debug!(%label, name = self.labels.name(label), pc = self.virtual_pc, "label placed");
        Ok(())
    }

    pub fn label_address(&self, label: Label) -> Result<u32> {
        self.labels.address(label)
    }

    pub fn emit(&mut self, instr: Instruction) {
        trace!(pc = self.virtual_pc, ?instr, "emit");
        self.log.push(Record {
            pc: self.virtual_pc,
            instr,
        });
        self.virtual_pc = self.virtual_pc.wrapping_add(4);
    }

    pub(crate) fn emit_r(&mut self, funct: u32, rd: Reg, rs: Reg, rt: Reg, shift: u32) {
        self.emit(Instruction::R(RType {
            opcode: 0,
            rs: rs.id() as u32,
            rt: rt.id() as u32,
            rd: rd.id() as u32,
            shift,
            funct,
        }));
    }

    pub(crate) fn emit_i(&mut self, opcode: u32, rs: u32, rt: u32, imm: Imm) {
        self.emit(Instruction::I { opcode, rs, rt, imm });
    }

    /// Emits a PC-relative branch whose offset is resolved at finalize.
    pub(crate) fn emit_branch(&mut self, opcode: u32, rs: u32, rt: u32, target: Label) {
        self.emit_i(opcode, rs, rt, Imm::Branch(target));
    }

    /// Emits an absolute jump. The target is checked against the current PC
    /// right away.
    pub(crate) fn emit_jump(&mut self, opcode: u32, address: u32) -> Result<()> {
        let index = jump_index(address, self.virtual_pc)?;
        self.emit(Instruction::J {
            opcode,
            target: JumpTarget::Index(index),
        });
        Ok(())
    }

    pub(crate) fn emit_jump_label(&mut self, opcode: u32, target: Label) {
        self.emit(Instruction::J {
            opcode,
            target: JumpTarget::Label(target),
        });
    }

    /// Resolves every record and packs the result. The session is left
    /// untouched, so calling this again gives the same program.
    pub fn finalize(&self) -> Result<Program> {
        self.finalize_indexed().map_err(|(_, err)| err)
    }

    /// Same as [`finalize`](Assembler::finalize), but a failure also carries the
    /// index of the offending record in [`records`](Assembler::records).
    pub fn finalize_indexed(&self) -> Result<Program, (usize, AsmError)> {
        let order = self.cfg.endianness;
        let mut words = Vec::with_capacity(self.log.len());
        for (i, rec) in self.log.iter().enumerate() {
            let word = rec
                .resolve(&self.labels)
                .and_then(|w| w.encode())
                .map_err(|err| {
                    debug!(pc = rec.pc, label = ?rec.instr.label(), %err, "finalize failed");
                    (i, err)
                })?;
            words.push(order.apply(word));
        }
        debug!(
            start = self.cfg.start_pc,
            words = words.len(),
            endianness = ?order,
            "finalized"
        );
        Ok(Program {
            start_pc: self.cfg.start_pc,
            endianness: order,
            words,
        })
    }

    pub fn assemble_as_list(&self) -> Result<Vec<u32>> {
        Ok(self.finalize()?.words)
    }

    pub fn assemble_as_hex_string(&self) -> Result<String> {
        Ok(self.finalize()?.to_hex_string())
    }

    pub fn assemble_as_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.finalize()?.to_bytes())
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::with_config(AssemblerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_pc_advances_per_emission() {
        let mut asm = Assembler::new(0x100, Endianness::Big);
        assert_eq!(asm.virtual_pc(), 0x100);
        asm.emit(Instruction::Nop);
        asm.emit(Instruction::Data(7));
        assert_eq!(asm.virtual_pc(), 0x108);
        assert_eq!(asm.records()[1].pc, 0x104);
    }

    #[test]
    fn virtual_pc_wraps() {
        let mut asm = Assembler::new(0xFFFF_FFFC, Endianness::Big);
        asm.emit(Instruction::Nop);
        assert_eq!(asm.virtual_pc(), 0);
    }

    #[test]
    fn label_takes_current_pc() {
        let mut asm = Assembler::new(0x40, Endianness::Big);
        let l = asm.new_label();
        assert_eq!(asm.label_address(l), Err(AsmError::LabelNotAssigned { label: l }));
        asm.emit(Instruction::Nop);
        asm.place_label(l).unwrap();
        assert_eq!(asm.label_address(l), Ok(0x44));
        assert_eq!(
            asm.place_label(l),
            Err(AsmError::LabelAlreadyAssigned { label: l, address: 0x44 })
        );
    }

    #[test]
    fn rejected_jump_is_not_logged() {
        let mut asm = Assembler::new(0, Endianness::Big);
        assert!(asm.emit_jump(2, 0x3).is_err());
        assert!(asm.records().is_empty());
        assert_eq!(asm.virtual_pc(), 0);
    }

    #[test]
    fn failing_record_index_is_reported() {
        let mut asm = Assembler::new(0, Endianness::Big);
        let l = asm.new_label();
        asm.emit(Instruction::Nop);
        asm.emit_branch(4, 0, 0, l);
        assert_eq!(
            asm.finalize_indexed(),
            Err((1, AsmError::LabelNotAssigned { label: l }))
        );
        assert_eq!(asm.finalize(), Err(AsmError::LabelNotAssigned { label: l }));
    }

    #[test]
    fn config_roundtrip_defaults() {
        let cfg: AssemblerConfig = serde_json::from_str(r#"{"endianness":"big"}"#).unwrap();
        assert_eq!(cfg.start_pc, 0);
        assert_eq!(cfg.endianness, Endianness::Big);
        assert_eq!(Assembler::default().endianness(), Endianness::Little);
    }
}
