use std::fmt;

use serde::{Deserialize, Serialize};

use crate::label::Label;

/// A bitfield of an encoded word, named in range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Opcode,
    Rs,
    Rt,
    Rd,
    Shift,
    Funct,
    Fmt,
    Ft,
    Fs,
    Fd,
    Code,
    Immediate,
    BranchOffset,
    JumpIndex,
}

impl Field {
    /// Largest unsigned value the field can hold.
    pub const fn max(self) -> u32 {
        match self {
            Field::Opcode | Field::Funct => 0x3F,
            Field::Rs
            | Field::Rt
            | Field::Rd
            | Field::Shift
            | Field::Fmt
            | Field::Ft
            | Field::Fs
            | Field::Fd => 0x1F,
            Field::Code | Field::Immediate | Field::BranchOffset => 0xFFFF,
            Field::JumpIndex => 0x03FF_FFFF,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Opcode => "opcode",
            Field::Rs => "rs",
            Field::Rt => "rt",
            Field::Rd => "rd",
            Field::Shift => "shift",
            Field::Funct => "funct",
            Field::Fmt => "fmt",
            Field::Ft => "ft",
            Field::Fs => "fs",
            Field::Fd => "fd",
            Field::Code => "code",
            Field::Immediate => "immediate",
            Field::BranchOffset => "branch offset",
            Field::JumpIndex => "jump index",
        };
        f.write_str(name)
    }
}

/// Everything that can abort an assembly. None of these are transient: each one
/// means the program being assembled is malformed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("{field} value is too big: {value:#x}")]
    EncodingRange { field: Field, value: i64 },
    #[error("label {label} was not assigned")]
    LabelNotAssigned { label: Label },
    #[error("label {label} was already assigned to {address:#010x}")]
    LabelAlreadyAssigned { label: Label, address: u32 },
    #[error("label address {address:#x} is out of range")]
    InvalidAddress { address: i64 },
    #[error(
        "can't encode jump to {target:#010x} from {pc:#010x}: target is outside the current 256 MiB segment"
    )]
    JumpSegmentMismatch { target: u32, pc: u32 },
    #[error("can't encode jump to {target:#010x}: target is not word aligned")]
    JumpAlignment { target: u32 },
    #[error("label {label} does not belong to this assembler")]
    UnknownLabel { label: Label },
}

pub type Result<T, E = AsmError> = std::result::Result<T, E>;
