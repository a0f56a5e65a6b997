use mips_asm::{AsmError, Assembler, Endianness};
use pretty_assertions::assert_eq;

const PC: u32 = 0x0896_D6E4;

#[test]
fn j_and_jal_reference_words() {
    let mut asm = Assembler::new(PC, Endianness::Big);
    asm.j(0x08FD_23A0).unwrap();
    asm.jal(0x08FD_23A0).unwrap();
    assert_eq!(asm.assemble_as_hex_string().unwrap(), "0A3F48E80E3F48E8");
}

#[test]
fn j_rejects_unaligned_target() {
    let mut asm = Assembler::new(PC, Endianness::Big);
    assert_eq!(
        asm.j(0x08FD_23A1),
        Err(AsmError::JumpAlignment { target: 0x08FD_23A1 })
    );
    assert!(asm.records().is_empty());
}

#[test]
fn j_rejects_other_segment() {
    let mut asm = Assembler::new(PC, Endianness::Big);
    assert_eq!(
        asm.jal(0xF8FD_23A0),
        Err(AsmError::JumpSegmentMismatch {
            target: 0xF8FD_23A0,
            pc: PC
        })
    );
}

#[test]
fn segment_is_taken_from_delay_slot() {
    let mut asm = Assembler::new(0x0FFF_FFFC, Endianness::Big);
    assert!(asm.j(0x0000_0100).is_err());
    asm.j(0x1000_0100).unwrap();
    assert_eq!(asm.assemble_as_list().unwrap(), vec![0x0800_0040]);
}

#[test]
fn label_jump_resolves_at_finalize() {
    let mut asm = Assembler::new(0x8000_0000, Endianness::Big);
    let func = asm.new_named_label("func");
    asm.jal_label(func);
    asm.nop();
    asm.j_label(func);
    asm.nop();
    asm.place_label(func).unwrap();
    asm.jr(mips_asm::Reg::Ra);
    let words = asm.assemble_as_list().unwrap();
    // 0x80000010 -> index 0x4
    assert_eq!(words[0], 0x0C00_0004);
    assert_eq!(words[2], 0x0800_0004);
}

#[test]
fn label_jump_segment_checked_at_finalize() {
    let mut asm = Assembler::new(0x0FFF_FFF8, Endianness::Big);
    let back = asm.new_label();
    asm.place_label(back).unwrap();
    asm.nop();
    // delay slot of this jump sits at 0x10000000
    asm.j_label(back);
    assert_eq!(
        asm.finalize(),
        Err(AsmError::JumpSegmentMismatch {
            target: 0x0FFF_FFF8,
            pc: 0x0FFF_FFFC
        })
    );
}
