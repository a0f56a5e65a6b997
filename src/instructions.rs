use crate::error::AsmError;
use crate::format::{FpType, TrapType};
use crate::label::Label;
use crate::record::{Imm, Instruction};
use crate::reg::{FReg, Reg};
use crate::Assembler;

/// Primary opcodes (bits 31..26).
pub mod op {
    pub const SPECIAL: u32 = 0x00;
    pub const REGIMM: u32 = 0x01;
    pub const J: u32 = 0x02;
    pub const JAL: u32 = 0x03;
    pub const BEQ: u32 = 0x04;
    pub const BNE: u32 = 0x05;
    pub const BLEZ: u32 = 0x06;
    pub const BGTZ: u32 = 0x07;
    pub const ADDI: u32 = 0x08;
    pub const ADDIU: u32 = 0x09;
    pub const SLTI: u32 = 0x0A;
    pub const SLTIU: u32 = 0x0B;
    pub const ANDI: u32 = 0x0C;
    pub const ORI: u32 = 0x0D;
    pub const XORI: u32 = 0x0E;
    pub const LUI: u32 = 0x0F;
    pub const COP1: u32 = 0x11;
    pub const LB: u32 = 0x20;
    pub const LH: u32 = 0x21;
    pub const LW: u32 = 0x23;
    pub const LBU: u32 = 0x24;
    pub const LHU: u32 = 0x25;
    pub const SB: u32 = 0x28;
    pub const SH: u32 = 0x29;
    pub const SW: u32 = 0x2B;
    pub const LWC1: u32 = 0x31;
    pub const SWC1: u32 = 0x39;
}

/// SPECIAL function codes (bits 5..0).
pub mod funct {
    pub const SLL: u32 = 0x00;
    pub const SRL: u32 = 0x02;
    pub const SRA: u32 = 0x03;
    pub const SLLV: u32 = 0x04;
    pub const SRLV: u32 = 0x06;
    pub const SRAV: u32 = 0x07;
    pub const JR: u32 = 0x08;
    pub const JALR: u32 = 0x09;
    pub const SYSCALL: u32 = 0x0C;
    pub const BREAK: u32 = 0x0D;
    pub const MFHI: u32 = 0x10;
    pub const MTHI: u32 = 0x11;
    pub const MFLO: u32 = 0x12;
    pub const MTLO: u32 = 0x13;
    pub const MULT: u32 = 0x18;
    pub const MULTU: u32 = 0x19;
    pub const DIV: u32 = 0x1A;
    pub const DIVU: u32 = 0x1B;
    pub const ADD: u32 = 0x20;
    pub const ADDU: u32 = 0x21;
    pub const SUB: u32 = 0x22;
    pub const SUBU: u32 = 0x23;
    pub const AND: u32 = 0x24;
    pub const OR: u32 = 0x25;
    pub const XOR: u32 = 0x26;
    pub const NOR: u32 = 0x27;
    pub const SLT: u32 = 0x2A;
    pub const SLTU: u32 = 0x2B;
}

/// REGIMM branch selectors, carried in the `rt` field.
pub mod regimm {
    pub const BLTZ: u32 = 0x00;
    pub const BGEZ: u32 = 0x01;
    pub const BLTZAL: u32 = 0x10;
    pub const BGEZAL: u32 = 0x11;
}

/// COP1 `fmt`/`rs` selectors and function codes.
pub mod cop1 {
    pub const MF: u32 = 0x00;
    pub const MT: u32 = 0x04;
    pub const BC: u32 = 0x08;
    pub const FMT_S: u32 = 0x10;
    pub const FMT_D: u32 = 0x11;
    pub const FMT_W: u32 = 0x14;

    pub const ADD: u32 = 0x00;
    pub const SUB: u32 = 0x01;
    pub const MUL: u32 = 0x02;
    pub const DIV: u32 = 0x03;
    pub const SQRT: u32 = 0x04;
    pub const ABS: u32 = 0x05;
    pub const MOV: u32 = 0x06;
    pub const NEG: u32 = 0x07;
    pub const CVT_S: u32 = 0x20;
    pub const CVT_D: u32 = 0x21;
    pub const CVT_W: u32 = 0x24;
    pub const C_EQ: u32 = 0x32;
    pub const C_LT: u32 = 0x3C;
    pub const C_LE: u32 = 0x3E;
}

/// Operand layout of a mnemonic, as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `rd, rs, rt`
    Reg3,
    /// `rd, rt, rs` (variable shifts)
    ShiftVar,
    /// `rd, rt, sa`
    ShiftImm,
    /// `rs, rt` (hi/lo producers)
    RsRt,
    /// `rd`
    Rd,
    /// `rs`
    Rs,
    /// `rd, rs`
    RdRs,
    /// `rt, rs, imm`
    RtRsImm,
    /// `rt, imm`
    RtImm,
    /// `rt, offset(base)`
    Mem,
    /// `ft, offset(base)`
    FpMem,
    /// `rs, rt, label`
    Branch2,
    /// `rs, label`; `sel` goes into the `rt` field
    Branch1,
    /// `label` with COP1 condition selector in `sel`
    FpBranch,
    /// `address` or `label`
    Jump,
    /// optional `code`
    Trap,
    /// `fd, fs, ft`; `sel` is the format
    Fp3,
    /// `fd, fs`; `sel` is the source format
    Fp2,
    /// `fs, ft`; `sel` is the format
    FpCmp,
    /// `rt, fs`; `sel` is the move direction
    FpMove,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    pub shape: Shape,
    pub opcode: u32,
    pub funct: u32,
    pub sel: u32,
}

const fn d(mnemonic: &'static str, shape: Shape, opcode: u32, funct: u32, sel: u32) -> InstrDesc {
    InstrDesc {
        mnemonic,
        shape,
        opcode,
        funct,
        sel,
    }
}

pub const TABLE: &[InstrDesc] = &[
    d("add", Shape::Reg3, op::SPECIAL, funct::ADD, 0),
    d("addu", Shape::Reg3, op::SPECIAL, funct::ADDU, 0),
    d("and", Shape::Reg3, op::SPECIAL, funct::AND, 0),
    d("nor", Shape::Reg3, op::SPECIAL, funct::NOR, 0),
    d("or", Shape::Reg3, op::SPECIAL, funct::OR, 0),
    d("slt", Shape::Reg3, op::SPECIAL, funct::SLT, 0),
    d("sltu", Shape::Reg3, op::SPECIAL, funct::SLTU, 0),
    d("sub", Shape::Reg3, op::SPECIAL, funct::SUB, 0),
    d("subu", Shape::Reg3, op::SPECIAL, funct::SUBU, 0),
    d("xor", Shape::Reg3, op::SPECIAL, funct::XOR, 0),
    d("sllv", Shape::ShiftVar, op::SPECIAL, funct::SLLV, 0),
    d("srlv", Shape::ShiftVar, op::SPECIAL, funct::SRLV, 0),
    d("srav", Shape::ShiftVar, op::SPECIAL, funct::SRAV, 0),
    d("sll", Shape::ShiftImm, op::SPECIAL, funct::SLL, 0),
    d("srl", Shape::ShiftImm, op::SPECIAL, funct::SRL, 0),
    d("sra", Shape::ShiftImm, op::SPECIAL, funct::SRA, 0),
    d("mult", Shape::RsRt, op::SPECIAL, funct::MULT, 0),
    d("multu", Shape::RsRt, op::SPECIAL, funct::MULTU, 0),
    d("div", Shape::RsRt, op::SPECIAL, funct::DIV, 0),
    d("divu", Shape::RsRt, op::SPECIAL, funct::DIVU, 0),
    d("mfhi", Shape::Rd, op::SPECIAL, funct::MFHI, 0),
    d("mflo", Shape::Rd, op::SPECIAL, funct::MFLO, 0),
    d("mthi", Shape::Rs, op::SPECIAL, funct::MTHI, 0),
    d("mtlo", Shape::Rs, op::SPECIAL, funct::MTLO, 0),
    d("jr", Shape::Rs, op::SPECIAL, funct::JR, 0),
    d("jalr", Shape::RdRs, op::SPECIAL, funct::JALR, 0),
    d("syscall", Shape::Trap, op::SPECIAL, funct::SYSCALL, 0),
    d("break", Shape::Trap, op::SPECIAL, funct::BREAK, 0),
    d("addi", Shape::RtRsImm, op::ADDI, 0, 0),
    d("addiu", Shape::RtRsImm, op::ADDIU, 0, 0),
    d("andi", Shape::RtRsImm, op::ANDI, 0, 0),
    d("ori", Shape::RtRsImm, op::ORI, 0, 0),
    d("slti", Shape::RtRsImm, op::SLTI, 0, 0),
    d("sltiu", Shape::RtRsImm, op::SLTIU, 0, 0),
    d("xori", Shape::RtRsImm, op::XORI, 0, 0),
    d("lui", Shape::RtImm, op::LUI, 0, 0),
    d("lb", Shape::Mem, op::LB, 0, 0),
    d("lbu", Shape::Mem, op::LBU, 0, 0),
    d("lh", Shape::Mem, op::LH, 0, 0),
    d("lhu", Shape::Mem, op::LHU, 0, 0),
    d("lw", Shape::Mem, op::LW, 0, 0),
    d("sb", Shape::Mem, op::SB, 0, 0),
    d("sh", Shape::Mem, op::SH, 0, 0),
    d("sw", Shape::Mem, op::SW, 0, 0),
    d("lwc1", Shape::FpMem, op::LWC1, 0, 0),
    d("swc1", Shape::FpMem, op::SWC1, 0, 0),
    d("beq", Shape::Branch2, op::BEQ, 0, 0),
    d("bne", Shape::Branch2, op::BNE, 0, 0),
    d("blez", Shape::Branch1, op::BLEZ, 0, 0),
    d("bgtz", Shape::Branch1, op::BGTZ, 0, 0),
    d("bltz", Shape::Branch1, op::REGIMM, 0, regimm::BLTZ),
    d("bgez", Shape::Branch1, op::REGIMM, 0, regimm::BGEZ),
    d("bltzal", Shape::Branch1, op::REGIMM, 0, regimm::BLTZAL),
    d("bgezal", Shape::Branch1, op::REGIMM, 0, regimm::BGEZAL),
    d("bc1f", Shape::FpBranch, op::COP1, 0, 0),
    d("bc1t", Shape::FpBranch, op::COP1, 0, 1),
    d("j", Shape::Jump, op::J, 0, 0),
    d("jal", Shape::Jump, op::JAL, 0, 0),
    d("add.s", Shape::Fp3, op::COP1, cop1::ADD, cop1::FMT_S),
    d("add.d", Shape::Fp3, op::COP1, cop1::ADD, cop1::FMT_D),
    d("sub.s", Shape::Fp3, op::COP1, cop1::SUB, cop1::FMT_S),
    d("sub.d", Shape::Fp3, op::COP1, cop1::SUB, cop1::FMT_D),
    d("mul.s", Shape::Fp3, op::COP1, cop1::MUL, cop1::FMT_S),
    d("mul.d", Shape::Fp3, op::COP1, cop1::MUL, cop1::FMT_D),
    d("div.s", Shape::Fp3, op::COP1, cop1::DIV, cop1::FMT_S),
    d("div.d", Shape::Fp3, op::COP1, cop1::DIV, cop1::FMT_D),
    d("sqrt.s", Shape::Fp2, op::COP1, cop1::SQRT, cop1::FMT_S),
    d("sqrt.d", Shape::Fp2, op::COP1, cop1::SQRT, cop1::FMT_D),
    d("abs.s", Shape::Fp2, op::COP1, cop1::ABS, cop1::FMT_S),
    d("abs.d", Shape::Fp2, op::COP1, cop1::ABS, cop1::FMT_D),
    d("mov.s", Shape::Fp2, op::COP1, cop1::MOV, cop1::FMT_S),
    d("mov.d", Shape::Fp2, op::COP1, cop1::MOV, cop1::FMT_D),
    d("neg.s", Shape::Fp2, op::COP1, cop1::NEG, cop1::FMT_S),
    d("neg.d", Shape::Fp2, op::COP1, cop1::NEG, cop1::FMT_D),
    d("cvt.s.d", Shape::Fp2, op::COP1, cop1::CVT_S, cop1::FMT_D),
    d("cvt.s.w", Shape::Fp2, op::COP1, cop1::CVT_S, cop1::FMT_W),
    d("cvt.d.s", Shape::Fp2, op::COP1, cop1::CVT_D, cop1::FMT_S),
    d("cvt.d.w", Shape::Fp2, op::COP1, cop1::CVT_D, cop1::FMT_W),
    d("cvt.w.s", Shape::Fp2, op::COP1, cop1::CVT_W, cop1::FMT_S),
    d("cvt.w.d", Shape::Fp2, op::COP1, cop1::CVT_W, cop1::FMT_D),
    d("c.eq.s", Shape::FpCmp, op::COP1, cop1::C_EQ, cop1::FMT_S),
    d("c.eq.d", Shape::FpCmp, op::COP1, cop1::C_EQ, cop1::FMT_D),
    d("c.lt.s", Shape::FpCmp, op::COP1, cop1::C_LT, cop1::FMT_S),
    d("c.lt.d", Shape::FpCmp, op::COP1, cop1::C_LT, cop1::FMT_D),
    d("c.le.s", Shape::FpCmp, op::COP1, cop1::C_LE, cop1::FMT_S),
    d("c.le.d", Shape::FpCmp, op::COP1, cop1::C_LE, cop1::FMT_D),
    d("mfc1", Shape::FpMove, op::COP1, 0, cop1::MF),
    d("mtc1", Shape::FpMove, op::COP1, 0, cop1::MT),
    d("nop", Shape::None, op::SPECIAL, 0, 0),
];

pub fn lookup(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// A parsed operand handed to [`Assembler::emit_desc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    FReg(FReg),
    Imm(i64),
    Mem { offset: i64, base: Reg },
    Label(Label),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("{mnemonic}: expected operands `{expected}`")]
    Operands {
        mnemonic: &'static str,
        expected: &'static str,
    },
    #[error("{mnemonic}: immediate {value:#x} does not fit in 32 bits")]
    Immediate { mnemonic: &'static str, value: i64 },
    #[error(transparent)]
    Asm(#[from] AsmError),
}

impl Shape {
    pub fn syntax(self) -> &'static str {
        match self {
            Shape::Reg3 => "rd, rs, rt",
            Shape::ShiftVar => "rd, rt, rs",
            Shape::ShiftImm => "rd, rt, sa",
            Shape::RsRt => "rs, rt",
            Shape::Rd => "rd",
            Shape::Rs => "rs",
            Shape::RdRs => "rd, rs",
            Shape::RtRsImm => "rt, rs, imm",
            Shape::RtImm => "rt, imm",
            Shape::Mem => "rt, offset(base)",
            Shape::FpMem => "ft, offset(base)",
            Shape::Branch2 => "rs, rt, label",
            Shape::Branch1 => "rs, label",
            Shape::FpBranch => "label",
            Shape::Jump => "address|label",
            Shape::Trap => "[code]",
            Shape::Fp3 => "fd, fs, ft",
            Shape::Fp2 => "fd, fs",
            Shape::FpCmp => "fs, ft",
            Shape::FpMove => "rt, fs",
            Shape::None => "",
        }
    }
}

fn r(x: Reg) -> u32 {
    x.id() as u32
}

fn f(x: FReg) -> u32 {
    x.id() as u32
}

impl Assembler {
    /// Emits the table entry `desc` with already parsed operands.
    pub fn emit_desc(&mut self, desc: &InstrDesc, ops: &[Operand]) -> Result<(), EmitError> {
        use Operand as O;

        let bad = || EmitError::Operands {
            mnemonic: desc.mnemonic,
            expected: desc.shape.syntax(),
        };
        let imm32 = |v: i64| {
            i32::try_from(v).map_err(|_| EmitError::Immediate {
                mnemonic: desc.mnemonic,
                value: v,
            })
        };

        match (desc.shape, ops) {
            (Shape::Reg3, [O::Reg(rd), O::Reg(rs), O::Reg(rt)]) => {
                self.emit_r(desc.funct, *rd, *rs, *rt, 0)
            }
            (Shape::ShiftVar, [O::Reg(rd), O::Reg(rt), O::Reg(rs)]) => {
                self.emit_r(desc.funct, *rd, *rs, *rt, 0)
            }
            (Shape::ShiftImm, [O::Reg(rd), O::Reg(rt), O::Imm(sa)]) => {
                let sa = u32::try_from(*sa).map_err(|_| bad())?;
                self.emit_r(desc.funct, *rd, Reg::Zero, *rt, sa)
            }
            (Shape::RsRt, [O::Reg(rs), O::Reg(rt)]) => {
                self.emit_r(desc.funct, Reg::Zero, *rs, *rt, 0)
            }
            (Shape::Rd, [O::Reg(rd)]) => self.emit_r(desc.funct, *rd, Reg::Zero, Reg::Zero, 0),
            (Shape::Rs, [O::Reg(rs)]) => self.emit_r(desc.funct, Reg::Zero, *rs, Reg::Zero, 0),
            (Shape::RdRs, [O::Reg(rs)]) => self.emit_r(desc.funct, Reg::Ra, *rs, Reg::Zero, 0),
            (Shape::RdRs, [O::Reg(rd), O::Reg(rs)]) => {
                self.emit_r(desc.funct, *rd, *rs, Reg::Zero, 0)
            }
            (Shape::RtRsImm, [O::Reg(rt), O::Reg(rs), O::Imm(v)]) => {
                self.emit_i(desc.opcode, r(*rs), r(*rt), Imm::Value(imm32(*v)?))
            }
            (Shape::RtImm, [O::Reg(rt), O::Imm(v)]) => {
                self.emit_i(desc.opcode, 0, r(*rt), Imm::Value(imm32(*v)?))
            }
            (Shape::Mem, [O::Reg(rt), O::Mem { offset, base }]) => {
                self.emit_i(desc.opcode, r(*base), r(*rt), Imm::Value(imm32(*offset)?))
            }
            (Shape::FpMem, [O::FReg(ft), O::Mem { offset, base }]) => {
                self.emit_i(desc.opcode, r(*base), f(*ft), Imm::Value(imm32(*offset)?))
            }
            (Shape::Branch2, [O::Reg(rs), O::Reg(rt), O::Label(l)]) => {
                self.emit_branch(desc.opcode, r(*rs), r(*rt), *l)
            }
            (Shape::Branch1, [O::Reg(rs), O::Label(l)]) => {
                self.emit_branch(desc.opcode, r(*rs), desc.sel, *l)
            }
            (Shape::FpBranch, [O::Label(l)]) => {
                self.emit_branch(desc.opcode, cop1::BC, desc.sel, *l)
            }
            (Shape::Jump, [O::Imm(addr)]) => {
                let addr = u32::try_from(*addr).map_err(|_| EmitError::Immediate {
                    mnemonic: desc.mnemonic,
                    value: *addr,
                })?;
                self.emit_jump(desc.opcode, addr)?
            }
            (Shape::Jump, [O::Label(l)]) => self.emit_jump_label(desc.opcode, *l),
            (Shape::Trap, []) => self.emit_trap(desc.funct, 0),
            (Shape::Trap, [O::Imm(code)]) => {
                let code = u32::try_from(*code).map_err(|_| bad())?;
                self.emit_trap(desc.funct, code)
            }
            (Shape::Fp3, [O::FReg(fd), O::FReg(fs), O::FReg(ft)]) => {
                self.emit_fp(desc.sel, desc.funct, *fd, *fs, *ft)
            }
            (Shape::Fp2, [O::FReg(fd), O::FReg(fs)]) => {
                self.emit_fp(desc.sel, desc.funct, *fd, *fs, FReg::F0)
            }
            (Shape::FpCmp, [O::FReg(fs), O::FReg(ft)]) => {
                self.emit_fp(desc.sel, desc.funct, FReg::F0, *fs, *ft)
            }
            (Shape::FpMove, [O::Reg(rt), O::FReg(fs)]) => self.emit_fp_move(desc.sel, *rt, *fs),
            (Shape::None, []) => self.emit(Instruction::Nop),
            _ => return Err(bad()),
        }
        Ok(())
    }

    pub(crate) fn emit_trap(&mut self, funct: u32, code: u32) {
        self.emit(Instruction::Trap(TrapType {
            opcode: op::SPECIAL,
            code,
            funct,
        }));
    }

    pub(crate) fn emit_fp(&mut self, fmt: u32, funct: u32, fd: FReg, fs: FReg, ft: FReg) {
        self.emit(Instruction::Fp(FpType {
            opcode: op::COP1,
            fmt,
            ft: f(ft),
            fs: f(fs),
            fd: f(fd),
            funct,
        }));
    }

    pub(crate) fn emit_fp_move(&mut self, dir: u32, rt: Reg, fs: FReg) {
        self.emit(Instruction::Fp(FpType {
            opcode: op::COP1,
            fmt: dir,
            ft: r(rt),
            fs: f(fs),
            fd: 0,
            funct: 0,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Endianness;

    #[test]
    fn mnemonics_are_unique() {
        for (i, a) in TABLE.iter().enumerate() {
            assert!(
                TABLE[i + 1..].iter().all(|b| b.mnemonic != a.mnemonic),
                "duplicate {}",
                a.mnemonic
            );
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("ADDIU").unwrap().opcode, op::ADDIU);
        assert_eq!(lookup("c.lt.d").unwrap().funct, cop1::C_LT);
        assert!(lookup("bogus").is_none());
    }

    #[test]
    fn emit_from_table_matches_reference() {
        let mut asm = Assembler::new(0, Endianness::Big);
        asm.emit_desc(
            lookup("add").unwrap(),
            &[Operand::Reg(Reg::S0), Operand::Reg(Reg::A0), Operand::Reg(Reg::T0)],
        )
        .unwrap();
        asm.emit_desc(
            lookup("lw").unwrap(),
            &[Operand::Reg(Reg::S0), Operand::Mem { offset: 0xCD, base: Reg::A0 }],
        )
        .unwrap();
        asm.emit_desc(lookup("jalr").unwrap(), &[Operand::Reg(Reg::T9)])
            .unwrap();
        asm.emit_desc(lookup("syscall").unwrap(), &[]).unwrap();
        assert_eq!(
            asm.assemble_as_hex_string().unwrap(),
            "008880208C9000CD0320F8090000000C"
        );
    }

    #[test]
    fn wrong_operands_rejected() {
        let mut asm = Assembler::new(0, Endianness::Big);
        let err = asm
            .emit_desc(lookup("add").unwrap(), &[Operand::Reg(Reg::S0)])
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::Operands {
                mnemonic: "add",
                expected: "rd, rs, rt"
            }
        );
        assert_eq!(err.to_string(), "add: expected operands `rd, rs, rt`");
        assert!(asm.records().is_empty());
    }
}
