pub mod assembler;
pub mod deferred;
pub mod emit;
pub mod error;
pub mod format;
pub mod instructions;
pub mod label;
pub mod output;
pub mod record;
pub mod reg;

pub use assembler::{Assembler, AssemblerConfig};
pub use error::{AsmError, Field, Result};
pub use label::{Label, LabelState, LabelTable};
pub use output::{Endianness, Program};
pub use record::{Imm, Instruction, JumpTarget, Record};
pub use reg::{FReg, Reg};

/// Runs `init` against a fresh session and returns the finalized words.
pub fn assemble<F>(start_pc: u32, endianness: Endianness, init: F) -> Result<Vec<u32>>
where
    F: FnOnce(&mut Assembler) -> Result<()>,
{
    run(start_pc, endianness, init).map(|p| p.words)
}

pub fn assemble_as_hex_string<F>(start_pc: u32, endianness: Endianness, init: F) -> Result<String>
where
    F: FnOnce(&mut Assembler) -> Result<()>,
{
    run(start_pc, endianness, init).map(|p| p.to_hex_string())
}

pub fn assemble_as_bytes<F>(start_pc: u32, endianness: Endianness, init: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Assembler) -> Result<()>,
{
    run(start_pc, endianness, init).map(|p| p.to_bytes())
}

fn run<F>(start_pc: u32, endianness: Endianness, init: F) -> Result<Program>
where
    F: FnOnce(&mut Assembler) -> Result<()>,
{
    let mut asm = Assembler::new(start_pc, endianness);
    init(&mut asm)?;
    asm.finalize()
}
