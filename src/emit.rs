//! Named emission methods, one per mnemonic, plus the usual pseudo-instructions.
//!
//! Operand order follows assembler syntax: destination first, then sources.
//! Loads and stores take `(rt, offset, base)` for `rt, offset(base)`.

use crate::error::Result;
use crate::instructions::{cop1, funct, op, regimm};
use crate::label::Label;
use crate::record::{Imm, Instruction};
use crate::reg::{FReg, Reg};
use crate::Assembler;

fn id(r: Reg) -> u32 {
    r.id() as u32
}

impl Assembler {
    pub fn add(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::ADD, rd, rs, rt, 0)
    }

    pub fn addi(&mut self, rt: Reg, rs: Reg, imm: i32) {
        self.emit_i(op::ADDI, id(rs), id(rt), Imm::Value(imm))
    }

    pub fn addiu(&mut self, rt: Reg, rs: Reg, imm: i32) {
        self.emit_i(op::ADDIU, id(rs), id(rt), Imm::Value(imm))
    }

    pub fn addu(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::ADDU, rd, rs, rt, 0)
    }

    pub fn and(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::AND, rd, rs, rt, 0)
    }

    pub fn andi(&mut self, rt: Reg, rs: Reg, imm: i32) {
        self.emit_i(op::ANDI, id(rs), id(rt), Imm::Value(imm))
    }

    pub fn beq(&mut self, rs: Reg, rt: Reg, target: Label) {
        self.emit_branch(op::BEQ, id(rs), id(rt), target)
    }

    pub fn bne(&mut self, rs: Reg, rt: Reg, target: Label) {
        self.emit_branch(op::BNE, id(rs), id(rt), target)
    }

    pub fn bgez(&mut self, rs: Reg, target: Label) {
        self.emit_branch(op::REGIMM, id(rs), regimm::BGEZ, target)
    }

    pub fn bgezal(&mut self, rs: Reg, target: Label) {
        self.emit_branch(op::REGIMM, id(rs), regimm::BGEZAL, target)
    }

    pub fn bltz(&mut self, rs: Reg, target: Label) {
        self.emit_branch(op::REGIMM, id(rs), regimm::BLTZ, target)
    }

    pub fn bltzal(&mut self, rs: Reg, target: Label) {
        self.emit_branch(op::REGIMM, id(rs), regimm::BLTZAL, target)
    }

    pub fn blez(&mut self, rs: Reg, target: Label) {
        self.emit_branch(op::BLEZ, id(rs), 0, target)
    }

    pub fn bgtz(&mut self, rs: Reg, target: Label) {
        self.emit_branch(op::BGTZ, id(rs), 0, target)
    }

    pub fn div(&mut self, rs: Reg, rt: Reg) {
        self.emit_r(funct::DIV, Reg::Zero, rs, rt, 0)
    }

    pub fn divu(&mut self, rs: Reg, rt: Reg) {
        self.emit_r(funct::DIVU, Reg::Zero, rs, rt, 0)
    }

    /// Jump to an absolute address in the current 256 MiB segment.
    pub fn j(&mut self, address: u32) -> Result<()> {
        self.emit_jump(op::J, address)
    }

    pub fn jal(&mut self, address: u32) -> Result<()> {
        self.emit_jump(op::JAL, address)
    }

    /// Like [`j`](Assembler::j) but to a label; segment and alignment are
    /// checked at finalize.
    pub fn j_label(&mut self, target: Label) {
        self.emit_jump_label(op::J, target)
    }

    pub fn jal_label(&mut self, target: Label) {
        self.emit_jump_label(op::JAL, target)
    }

    pub fn jr(&mut self, rs: Reg) {
        self.emit_r(funct::JR, Reg::Zero, rs, Reg::Zero, 0)
    }

    pub fn jalr(&mut self, rd: Reg, rs: Reg) {
        self.emit_r(funct::JALR, rd, rs, Reg::Zero, 0)
    }

    pub fn lb(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::LB, id(base), id(rt), Imm::Value(offset))
    }

    pub fn lbu(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::LBU, id(base), id(rt), Imm::Value(offset))
    }

    pub fn lh(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::LH, id(base), id(rt), Imm::Value(offset))
    }

    pub fn lhu(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::LHU, id(base), id(rt), Imm::Value(offset))
    }

    pub fn lui(&mut self, rt: Reg, imm: i32) {
        self.emit_i(op::LUI, 0, id(rt), Imm::Value(imm))
    }

    pub fn lw(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::LW, id(base), id(rt), Imm::Value(offset))
    }

    pub fn mfhi(&mut self, rd: Reg) {
        self.emit_r(funct::MFHI, rd, Reg::Zero, Reg::Zero, 0)
    }

    pub fn mflo(&mut self, rd: Reg) {
        self.emit_r(funct::MFLO, rd, Reg::Zero, Reg::Zero, 0)
    }

    pub fn mthi(&mut self, rs: Reg) {
        self.emit_r(funct::MTHI, Reg::Zero, rs, Reg::Zero, 0)
    }

    pub fn mtlo(&mut self, rs: Reg) {
        self.emit_r(funct::MTLO, Reg::Zero, rs, Reg::Zero, 0)
    }

    pub fn mult(&mut self, rs: Reg, rt: Reg) {
        self.emit_r(funct::MULT, Reg::Zero, rs, rt, 0)
    }

    pub fn multu(&mut self, rs: Reg, rt: Reg) {
        self.emit_r(funct::MULTU, Reg::Zero, rs, rt, 0)
    }

    pub fn nop(&mut self) {
        self.emit(Instruction::Nop)
    }

    pub fn nor(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::NOR, rd, rs, rt, 0)
    }

    pub fn or(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::OR, rd, rs, rt, 0)
    }

    pub fn ori(&mut self, rt: Reg, rs: Reg, imm: i32) {
        self.emit_i(op::ORI, id(rs), id(rt), Imm::Value(imm))
    }

    pub fn sb(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::SB, id(base), id(rt), Imm::Value(offset))
    }

    pub fn sh(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::SH, id(base), id(rt), Imm::Value(offset))
    }

    pub fn sll(&mut self, rd: Reg, rt: Reg, sa: u32) {
        self.emit_r(funct::SLL, rd, Reg::Zero, rt, sa)
    }

    pub fn sllv(&mut self, rd: Reg, rt: Reg, rs: Reg) {
        self.emit_r(funct::SLLV, rd, rs, rt, 0)
    }

    pub fn slt(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::SLT, rd, rs, rt, 0)
    }

    pub fn slti(&mut self, rt: Reg, rs: Reg, imm: i32) {
        self.emit_i(op::SLTI, id(rs), id(rt), Imm::Value(imm))
    }

    pub fn sltiu(&mut self, rt: Reg, rs: Reg, imm: i32) {
        self.emit_i(op::SLTIU, id(rs), id(rt), Imm::Value(imm))
    }

    pub fn sltu(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::SLTU, rd, rs, rt, 0)
    }

    pub fn sra(&mut self, rd: Reg, rt: Reg, sa: u32) {
        self.emit_r(funct::SRA, rd, Reg::Zero, rt, sa)
    }

    pub fn srav(&mut self, rd: Reg, rt: Reg, rs: Reg) {
        self.emit_r(funct::SRAV, rd, rs, rt, 0)
    }

    pub fn srl(&mut self, rd: Reg, rt: Reg, sa: u32) {
        self.emit_r(funct::SRL, rd, Reg::Zero, rt, sa)
    }

    pub fn srlv(&mut self, rd: Reg, rt: Reg, rs: Reg) {
        self.emit_r(funct::SRLV, rd, rs, rt, 0)
    }

    pub fn sub(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::SUB, rd, rs, rt, 0)
    }

    pub fn subu(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::SUBU, rd, rs, rt, 0)
    }

    pub fn sw(&mut self, rt: Reg, offset: i32, base: Reg) {
        self.emit_i(op::SW, id(base), id(rt), Imm::Value(offset))
    }

    pub fn syscall(&mut self, code: u32) {
        self.emit_trap(funct::SYSCALL, code)
    }

    pub fn r#break(&mut self, code: u32) {
        self.emit_trap(funct::BREAK, code)
    }

    pub fn xor(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.emit_r(funct::XOR, rd, rs, rt, 0)
    }

    pub fn xori(&mut self, rt: Reg, rs: Reg, imm: i32) {
        self.emit_i(op::XORI, id(rs), id(rt), Imm::Value(imm))
    }

    /// Embeds a literal word in the instruction stream.
    pub fn data(&mut self, word: u32) {
        self.emit(Instruction::Data(word))
    }

    // COP1

    pub fn add_s(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::ADD, fd, fs, ft)
    }

    pub fn add_d(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::ADD, fd, fs, ft)
    }

    pub fn sub_s(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::SUB, fd, fs, ft)
    }

    pub fn sub_d(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::SUB, fd, fs, ft)
    }

    pub fn mul_s(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::MUL, fd, fs, ft)
    }

    pub fn mul_d(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::MUL, fd, fs, ft)
    }

    pub fn div_s(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::DIV, fd, fs, ft)
    }

    pub fn div_d(&mut self, fd: FReg, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::DIV, fd, fs, ft)
    }

    pub fn sqrt_s(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::SQRT, fd, fs, FReg::F0)
    }

    pub fn sqrt_d(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::SQRT, fd, fs, FReg::F0)
    }

    pub fn abs_s(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::ABS, fd, fs, FReg::F0)
    }

    pub fn abs_d(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::ABS, fd, fs, FReg::F0)
    }

    pub fn mov_s(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::MOV, fd, fs, FReg::F0)
    }

    pub fn mov_d(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::MOV, fd, fs, FReg::F0)
    }

    pub fn neg_s(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::NEG, fd, fs, FReg::F0)
    }

    pub fn neg_d(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::NEG, fd, fs, FReg::F0)
    }

    pub fn cvt_s_d(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::CVT_S, fd, fs, FReg::F0)
    }

    pub fn cvt_s_w(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_W, cop1::CVT_S, fd, fs, FReg::F0)
    }

    pub fn cvt_d_s(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::CVT_D, fd, fs, FReg::F0)
    }

    pub fn cvt_d_w(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_W, cop1::CVT_D, fd, fs, FReg::F0)
    }

    pub fn cvt_w_s(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::CVT_W, fd, fs, FReg::F0)
    }

    pub fn cvt_w_d(&mut self, fd: FReg, fs: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::CVT_W, fd, fs, FReg::F0)
    }

    pub fn c_eq_s(&mut self, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::C_EQ, FReg::F0, fs, ft)
    }

    pub fn c_eq_d(&mut self, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::C_EQ, FReg::F0, fs, ft)
    }

    pub fn c_lt_s(&mut self, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::C_LT, FReg::F0, fs, ft)
    }

    pub fn c_lt_d(&mut self, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::C_LT, FReg::F0, fs, ft)
    }

    pub fn c_le_s(&mut self, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_S, cop1::C_LE, FReg::F0, fs, ft)
    }

    pub fn c_le_d(&mut self, fs: FReg, ft: FReg) {
        self.emit_fp(cop1::FMT_D, cop1::C_LE, FReg::F0, fs, ft)
    }

    pub fn mfc1(&mut self, rt: Reg, fs: FReg) {
        self.emit_fp_move(cop1::MF, rt, fs)
    }

    pub fn mtc1(&mut self, rt: Reg, fs: FReg) {
        self.emit_fp_move(cop1::MT, rt, fs)
    }

    pub fn lwc1(&mut self, ft: FReg, offset: i32, base: Reg) {
        self.emit_i(op::LWC1, id(base), ft.id() as u32, Imm::Value(offset))
    }

    pub fn swc1(&mut self, ft: FReg, offset: i32, base: Reg) {
        self.emit_i(op::SWC1, id(base), ft.id() as u32, Imm::Value(offset))
    }

    pub fn bc1f(&mut self, target: Label) {
        self.emit_branch(op::COP1, cop1::BC, 0, target)
    }

    pub fn bc1t(&mut self, target: Label) {
        self.emit_branch(op::COP1, cop1::BC, 1, target)
    }

    // Pseudo-instructions. Comparisons go through `$at`.
    //
    // The compare-branches take operands in assembler order, `blt rs, rt` means
    // `rs < rt`, and emit `slt $at, rs, rt` (or `rt, rs` for `bgt`/`ble`). Code
    // ported from emitters with a `blt(rt, rs)` signature needs its arguments
    // swapped.

    /// Unconditional PC-relative branch.
    pub fn b(&mut self, target: Label) {
        self.beq(Reg::Zero, Reg::Zero, target)
    }

    /// Branch if `rs < rt` (signed).
    pub fn blt(&mut self, rs: Reg, rt: Reg, target: Label) {
        self.slt(Reg::At, rs, rt);
        self.bne(Reg::At, Reg::Zero, target)
    }

    /// Branch if `rs >= rt` (signed).
    pub fn bge(&mut self, rs: Reg, rt: Reg, target: Label) {
        self.slt(Reg::At, rs, rt);
        self.beq(Reg::At, Reg::Zero, target)
    }

    /// Branch if `rs > rt` (signed).
    pub fn bgt(&mut self, rs: Reg, rt: Reg, target: Label) {
        self.slt(Reg::At, rt, rs);
        self.bne(Reg::At, Reg::Zero, target)
    }

    /// Branch if `rs <= rt` (signed).
    pub fn ble(&mut self, rs: Reg, rt: Reg, target: Label) {
        self.slt(Reg::At, rt, rs);
        self.beq(Reg::At, Reg::Zero, target)
    }

    pub fn neg(&mut self, rd: Reg, rt: Reg) {
        self.sub(rd, Reg::Zero, rt)
    }

    pub fn not(&mut self, rd: Reg, rs: Reg) {
        self.nor(rd, rs, Reg::Zero)
    }

    /// Loads a full 32-bit constant with `lui` + `ori`.
    pub fn la(&mut self, rd: Reg, value: u32) {
        self.lui(rd, (value >> 16) as i32);
        self.ori(rd, rd, (value & 0xFFFF) as i32)
    }

    /// Loads the address of `target`, which may be placed later.
    pub fn la_label(&mut self, rd: Reg, target: Label) {
        self.emit_i(op::LUI, 0, id(rd), Imm::High(target));
        self.emit_i(op::ORI, id(rd), id(rd), Imm::Low(target))
    }

    /// Single-instruction immediate load: sign-extending `addiu` for negative
    /// values, zero-extending `ori` otherwise.
    pub fn li(&mut self, rd: Reg, imm: i32) {
        if imm < 0 {
            self.addiu(rd, Reg::Zero, imm)
        } else {
            self.ori(rd, Reg::Zero, imm)
        }
    }

    pub fn r#move(&mut self, rd: Reg, rs: Reg) {
        self.addu(rd, rs, Reg::Zero)
    }

    /// `rd = (rs >= rt)`, signed.
    pub fn sge(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.slt(rd, rs, rt);
        self.li(Reg::At, 1);
        self.subu(rd, Reg::At, rd)
    }

    /// `rd = (rs > rt)`, signed.
    pub fn sgt(&mut self, rd: Reg, rs: Reg, rt: Reg) {
        self.slt(rd, rt, rs)
    }
}
