use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// General purpose registers, named by their o32 ABI role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Reg {
    Zero = 0,
    At = 1,
    V0 = 2,
    V1 = 3,
    A0 = 4,
    A1 = 5,
    A2 = 6,
    A3 = 7,
    T0 = 8,
    T1 = 9,
    T2 = 10,
    T3 = 11,
    T4 = 12,
    T5 = 13,
    T6 = 14,
    T7 = 15,
    S0 = 16,
    S1 = 17,
    S2 = 18,
    S3 = 19,
    S4 = 20,
    S5 = 21,
    S6 = 22,
    S7 = 23,
    T8 = 24,
    T9 = 25,
    K0 = 26,
    K1 = 27,
    Gp = 28,
    Sp = 29,
    Fp = 30,
    Ra = 31,
}

impl Reg {
    pub const ALL: [Reg; 32] = [
        Reg::Zero,
        Reg::At,
        Reg::V0,
        Reg::V1,
        Reg::A0,
        Reg::A1,
        Reg::A2,
        Reg::A3,
        Reg::T0,
        Reg::T1,
        Reg::T2,
        Reg::T3,
        Reg::T4,
        Reg::T5,
        Reg::T6,
        Reg::T7,
        Reg::S0,
        Reg::S1,
        Reg::S2,
        Reg::S3,
        Reg::S4,
        Reg::S5,
        Reg::S6,
        Reg::S7,
        Reg::T8,
        Reg::T9,
        Reg::K0,
        Reg::K1,
        Reg::Gp,
        Reg::Sp,
        Reg::Fp,
        Reg::Ra,
    ];

    const NAMES: [&'static str; 32] = [
        "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5",
        "t6", "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1",
        "gp", "sp", "fp", "ra",
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Reg> {
        Reg::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        Reg::NAMES[self as usize]
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown register: {0}")]
pub struct ParseRegError(pub String);

/// Accepts `$s0`, `s0`, `$16` and `$s8` (alias of `$fp`).
impl FromStr for Reg {
    type Err = ParseRegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let bare = name.strip_prefix('$').unwrap_or(name).to_ascii_lowercase();
        if let Ok(id) = bare.parse::<u8>() {
            return Reg::from_id(id).ok_or_else(|| ParseRegError(s.to_string()));
        }
        if bare == "s8" {
            return Ok(Reg::Fp);
        }
        Reg::NAMES
            .iter()
            .position(|n| *n == bare)
            .and_then(|i| Reg::from_id(i as u8))
            .ok_or_else(|| ParseRegError(s.to_string()))
    }
}

/// Coprocessor 1 (FPU) register `$f0`..`$f31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FReg(u8);

impl FReg {
    pub const F0: FReg = FReg(0);

    pub fn new(id: u8) -> Option<FReg> {
        (id < 32).then_some(FReg(id))
    }

    pub const fn id(self) -> u8 {
        self.0
    }
}

impl fmt::Display for FReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$f{}", self.0)
    }
}

impl FromStr for FReg {
    type Err = ParseRegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let bare = name.strip_prefix('$').unwrap_or(name);
        bare.strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(FReg::new)
            .ok_or_else(|| ParseRegError(s.to_string()))
    }
}
