use mips_asm::Reg::*;
use mips_asm::{
    assemble, assemble_as_bytes, assemble_as_hex_string, Assembler, AssemblerConfig, Endianness,
};
use pretty_assertions::assert_eq;

#[test]
fn little_endian_data_word() {
    let mut asm = Assembler::new(0, Endianness::Little);
    asm.data(0x1122_3344);
    let program = asm.finalize().unwrap();
    assert_eq!(program.words(), &[0x4433_2211]);
    assert_eq!(program.to_bytes(), vec![0x44, 0x33, 0x22, 0x11]);
    assert_eq!(program.to_hex_string(), "44332211");
}

#[test]
fn big_endian_data_word() {
    let bytes = assemble_as_bytes(0, Endianness::Big, |a| {
        a.data(0x1122_3344);
        Ok(())
    })
    .unwrap();
    assert_eq!(bytes, vec![0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn helpers_agree() {
    let prog = |a: &mut Assembler| -> mips_asm::Result<()> {
        a.addiu(Sp, Sp, -16);
        a.sw(Ra, 12, Sp);
        a.nop();
        Ok(())
    };
    let words = assemble(0, Endianness::Little, prog).unwrap();
    let hex = assemble_as_hex_string(0, Endianness::Little, prog).unwrap();
    let bytes = assemble_as_bytes(0, Endianness::Little, prog).unwrap();
    assert_eq!(words.len(), 3);
    assert_eq!(hex.len(), 24);
    assert_eq!(bytes.len(), 12);
    let from_words: String = words.iter().map(|w| format!("{w:08X}")).collect();
    assert_eq!(hex, from_words);
    let from_bytes: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
    assert_eq!(hex, from_bytes);
}

#[test]
fn nop_helpers() {
    assert_eq!(
        assemble(0, Endianness::Little, |a| {
            a.nop();
            Ok(())
        }),
        Ok(vec![0])
    );
    assert_eq!(
        assemble_as_hex_string(0, Endianness::Little, |a| {
            a.nop();
            Ok(())
        }),
        Ok("00000000".to_string())
    );
}

#[test]
fn helper_propagates_emission_errors() {
    let res = assemble(0, Endianness::Big, |a| {
        a.nop();
        a.j(0x3)?;
        a.nop();
        Ok(())
    });
    assert_eq!(res, Err(mips_asm::AsmError::JumpAlignment { target: 0x3 }));
}

#[test]
fn finalize_twice_is_identical() {
    let mut asm = Assembler::new(0x0040_0000, Endianness::Little);
    let done = asm.new_label();
    asm.la(T0, 0x1000_0000);
    asm.beq(T0, Zero, done);
    asm.nop();
    asm.place_label(done).unwrap();
    asm.jr(Ra);
    let first = asm.finalize().unwrap();
    let second = asm.finalize().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_bytes(), second.to_bytes());
    assert_eq!(asm.records().len(), 5);
}

#[test]
fn program_metadata() {
    let mut asm = Assembler::with_config(AssemblerConfig {
        start_pc: 0xBFC0_0000,
        endianness: Endianness::Big,
    });
    asm.nop();
    asm.nop();
    let program = asm.finalize().unwrap();
    assert_eq!(program.start_pc, 0xBFC0_0000);
    assert_eq!(program.end_pc(), 0xBFC0_0008);
    assert_eq!(program.len(), 2);
    let json = serde_json::to_value(&program).unwrap();
    assert_eq!(json["endianness"], "big");
    assert_eq!(json["words"], serde_json::json!([0, 0]));
}

#[test]
fn empty_session() {
    let asm = Assembler::default();
    let program = asm.finalize().unwrap();
    assert!(program.is_empty());
    assert_eq!(program.to_hex_string(), "");
}
