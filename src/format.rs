//! MIPS32 word formats.
//!
//! Every format packs its fields MSB first into a `u32`. Byte order is a
//! serialization concern and is not handled here.

use serde::{Deserialize, Serialize};

use crate::error::{AsmError, Field, Result};

/// Largest and smallest values accepted for a literal 16-bit immediate. Both the
/// signed (`-0x8000`) and unsigned (`0xFFFF`) readings of the field are allowed.
pub const IMM_MIN: i32 = -0x8000;
pub const IMM_MAX: i32 = 0xFFFF;

#[inline]
fn check(field: Field, value: u32) -> Result<u32> {
    if value > field.max() {
        return Err(AsmError::EncodingRange {
            field,
            value: value as i64,
        });
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RType {
    pub opcode: u32,
    pub rs: u32,
    pub rt: u32,
    pub rd: u32,
    pub shift: u32,
    pub funct: u32,
}

impl RType {
    pub fn encode(&self) -> Result<u32> {
        let opcode = check(Field::Opcode, self.opcode)?;
        let rs = check(Field::Rs, self.rs)?;
        let rt = check(Field::Rt, self.rt)?;
        let rd = check(Field::Rd, self.rd)?;
        let shift = check(Field::Shift, self.shift)?;
        let funct = check(Field::Funct, self.funct)?;
        Ok((opcode << 26) | (rs << 21) | (rt << 16) | (rd << 11) | (shift << 6) | funct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IType {
    pub opcode: u32,
    pub rs: u32,
    pub rt: u32,
    pub imm: i32,
}

impl IType {
    pub fn encode(&self) -> Result<u32> {
        let opcode = check(Field::Opcode, self.opcode)?;
        let rs = check(Field::Rs, self.rs)?;
        let rt = check(Field::Rt, self.rt)?;
        if !(IMM_MIN..=IMM_MAX).contains(&self.imm) {
            return Err(AsmError::EncodingRange {
                field: Field::Immediate,
                value: self.imm as i64,
            });
        }
        // two's complement truncation keeps negative values decodable as i16
        let imm = (self.imm as u32) & 0xFFFF;
        Ok((opcode << 26) | (rs << 21) | (rt << 16) | imm)
    }
}

/// Jump with a 26-bit word index (the target address without its segment
/// bits, shifted right by two).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JType {
    pub opcode: u32,
    pub index: u32,
}

impl JType {
    pub fn encode(&self) -> Result<u32> {
        let opcode = check(Field::Opcode, self.opcode)?;
        let index = check(Field::JumpIndex, self.index)?;
        Ok((opcode << 26) | index)
    }
}

/// `syscall`/`break` style word carrying a code for the exception handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapType {
    pub opcode: u32,
    pub code: u32,
    pub funct: u32,
}

impl TrapType {
    pub fn encode(&self) -> Result<u32> {
        let opcode = check(Field::Opcode, self.opcode)?;
        let code = check(Field::Code, self.code)?;
        let funct = check(Field::Funct, self.funct)?;
        Ok((opcode << 26) | (code << 6) | funct)
    }
}

/// COP1 register format: `fmt` selects single, double or word operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpType {
    pub opcode: u32,
    pub fmt: u32,
    pub ft: u32,
    pub fs: u32,
    pub fd: u32,
    pub funct: u32,
}

impl FpType {
    pub fn encode(&self) -> Result<u32> {
        let opcode = check(Field::Opcode, self.opcode)?;
        let fmt = check(Field::Fmt, self.fmt)?;
        let ft = check(Field::Ft, self.ft)?;
        let fs = check(Field::Fs, self.fs)?;
        let fd = check(Field::Fd, self.fd)?;
        let funct = check(Field::Funct, self.funct)?;
        Ok((opcode << 26) | (fmt << 21) | (ft << 16) | (fs << 11) | (fd << 6) | funct)
    }
}

/// A fully resolved instruction, ready to be packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Word {
    R(RType),
    I(IType),
    J(JType),
    Trap(TrapType),
    Fp(FpType),
    Data(u32),
    Nop,
}

impl Word {
    pub fn encode(&self) -> Result<u32> {
        match self {
            Word::R(r) => r.encode(),
            Word::I(i) => i.encode(),
            Word::J(j) => j.encode(),
            Word::Trap(t) => t.encode(),
            Word::Fp(f) => f.encode(),
            Word::Data(w) => Ok(*w),
            Word::Nop => Ok(0),
        }
    }
}
