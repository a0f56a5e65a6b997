use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;

use mips_asm::instructions::{lookup, Operand};
use mips_asm::{AsmError, Assembler, AssemblerConfig, FReg, Label, Program, Reg};
use tracing::debug;

/// One source statement. A line may hold a label followed by a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Label(String),
    Word(Vec<String>),
    Instr { mnemonic: String, operands: Vec<String> },
}

pub fn parse_num(s: &str) -> Option<i64> {
    let t = s.trim();
    let (neg, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    if t.starts_with(['-', '+']) {
        return None;
    }
    let v = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        if hex.starts_with(['-', '+']) {
            return None;
        }
        i64::from_str_radix(&hex.replace('_', ""), 16).ok()?
    } else {
        t.parse::<i64>().ok()?
    };
    Some(if neg { -v } else { v })
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Splits a line into statements. `#` and `;` start comments.
pub fn parse_line(line: &str) -> Result<Vec<Stmt>> {
    let mut s = line;
    if let Some(p) = s.find(['#', ';']) {
        s = &s[..p];
    }
    let mut s = s.trim();
    let mut out = Vec::new();
    while let Some(p) = s.find(':') {
        let name = s[..p].trim();
        if !is_ident(name) {
            bail!("bad label name: {name:?}");
        }
        out.push(Stmt::Label(name.to_string()));
        s = s[p + 1..].trim();
    }
    if s.is_empty() {
        return Ok(out);
    }
    let (mn, rest) = match s.find(char::is_whitespace) {
        Some(p) => (&s[..p], s[p..].trim()),
        None => (s, ""),
    };
    let operands: Vec<String> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(|x| x.trim().to_string()).collect()
    };
    if operands.iter().any(|o| o.is_empty()) {
        bail!("empty operand in {s:?}");
    }
    let mn = mn.to_lowercase();
    if mn == ".word" {
        if operands.is_empty() {
            bail!(".word needs at least one value");
        }
        out.push(Stmt::Word(operands));
    } else {
        out.push(Stmt::Instr {
            mnemonic: mn,
            operands,
        });
    }
    Ok(out)
}

/// Drives an [`Assembler`] from source text. Labels are created on first
/// mention so branches may refer forward.
pub struct SourceAssembler {
    asm: Assembler,
    labels: HashMap<String, Label>,
    /// Trimmed source lines fed so far, by line number minus one.
    lines: Vec<String>,
    /// Source line number of each emitted record.
    origin: Vec<usize>,
}

impl SourceAssembler {
    pub fn new(cfg: AssemblerConfig) -> Self {
        Self {
            asm: Assembler::with_config(cfg),
            labels: HashMap::new(),
            lines: Vec::new(),
            origin: Vec::new(),
        }
    }

    pub fn assembler(&self) -> &Assembler {
        &self.asm
    }

    fn label(&mut self, name: &str) -> Label {
        if let Some(l) = self.labels.get(name) {
            return *l;
        }
        let l = self.asm.new_named_label(name);
        self.labels.insert(name.to_string(), l);
        l
    }

    /// A label operand of a pseudo-instruction.
    fn label_operand(&mut self, s: &str) -> Result<Label> {
        if !is_ident(s) {
            bail!("expected label, got {s:?}");
        }
        Ok(self.label(s))
    }

    fn reg(s: &str) -> Result<Reg> {
        if !s.starts_with('$') {
            bail!("expected register, got {s:?}");
        }
        Ok(s.parse::<Reg>()?)
    }

    fn freg(s: &str) -> Result<FReg> {
        if !s.starts_with('$') {
            bail!("expected fp register, got {s:?}");
        }
        Ok(s.parse::<FReg>()?)
    }

    fn imm(s: &str) -> Result<i64> {
        parse_num(s).ok_or_else(|| anyhow!("bad immediate: {s:?}"))
    }

    fn imm32(s: &str) -> Result<i32> {
        let v = Self::imm(s)?;
        i32::try_from(v).map_err(|_| anyhow!("immediate out of range: {s}"))
    }

    fn operand(&mut self, s: &str) -> Result<Operand> {
        if let Some(open) = s.find('(') {
            // offset(base)
            let close = s
                .rfind(')')
                .filter(|c| *c > open)
                .ok_or_else(|| anyhow!("expected memory operand like off($reg): {s}"))?;
            let off = s[..open].trim();
            let offset = if off.is_empty() { 0 } else { Self::imm(off)? };
            let base = Self::reg(s[open + 1..close].trim())?;
            return Ok(Operand::Mem { offset, base });
        }
        if let Some(bare) = s.strip_prefix('$') {
            let fp = bare.len() > 1
                && bare.starts_with('f')
                && bare[1..].chars().all(|c| c.is_ascii_digit());
            if fp {
                return Ok(Operand::FReg(Self::freg(s)?));
            }
            return Ok(Operand::Reg(Self::reg(s)?));
        }
        if let Some(v) = parse_num(s) {
            return Ok(Operand::Imm(v));
        }
        if is_ident(s) {
            return Ok(Operand::Label(self.label(s)));
        }
        bail!("bad operand: {s:?}")
    }

    fn expect(ops: &[String], n: usize, syntax: &str) -> Result<()> {
        if ops.len() != n {
            bail!("expected `{syntax}`");
        }
        Ok(())
    }

    /// Pseudo-instructions that expand to several words or take a label where
    /// the table has none. Returns `false` when `mn` is not one of them.
    fn pseudo(&mut self, mn: &str, ops: &[String]) -> Result<bool> {
        match mn {
            "b" => {
                Self::expect(ops, 1, "b label")?;
                let l = self.label_operand(&ops[0])?;
                self.asm.b(l);
            }
            "blt" | "bge" | "bgt" | "ble" => {
                Self::expect(ops, 3, "bxx rs, rt, label")?;
                let rs = Self::reg(&ops[0])?;
                let rt = Self::reg(&ops[1])?;
                let l = self.label_operand(&ops[2])?;
                match mn {
                    "blt" => self.asm.blt(rs, rt, l),
                    "bge" => self.asm.bge(rs, rt, l),
                    "bgt" => self.asm.bgt(rs, rt, l),
                    _ => self.asm.ble(rs, rt, l),
                }
            }
            "neg" | "not" | "move" => {
                Self::expect(ops, 2, "op rd, rs")?;
                let rd = Self::reg(&ops[0])?;
                let rs = Self::reg(&ops[1])?;
                match mn {
                    "neg" => self.asm.neg(rd, rs),
                    "not" => self.asm.not(rd, rs),
                    _ => self.asm.r#move(rd, rs),
                }
            }
            "sge" | "sgt" => {
                Self::expect(ops, 3, "op rd, rs, rt")?;
                let rd = Self::reg(&ops[0])?;
                let rs = Self::reg(&ops[1])?;
                let rt = Self::reg(&ops[2])?;
                if mn == "sge" {
                    self.asm.sge(rd, rs, rt)
                } else {
                    self.asm.sgt(rd, rs, rt)
                }
            }
            "li" => {
                Self::expect(ops, 2, "li rd, imm")?;
                let rd = Self::reg(&ops[0])?;
                self.asm.li(rd, Self::imm32(&ops[1])?);
            }
            "la" => {
                Self::expect(ops, 2, "la rd, address|label")?;
                let rd = Self::reg(&ops[0])?;
                match parse_num(&ops[1]) {
                    Some(v) => {
                        let v = u32::try_from(v)
                            .or_else(|_| i32::try_from(v).map(|v| v as u32))
                            .map_err(|_| anyhow!("address out of range: {}", ops[1]))?;
                        self.asm.la(rd, v)
                    }
                    None => {
                        let l = self.label_operand(&ops[1])?;
                        self.asm.la_label(rd, l)
                    }
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn statement(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Label(name) => {
                let l = self.label(name);
                self.asm
                    .place_label(l)
                    .map_err(|e| self.describe(e))
                    .with_context(|| format!("label `{name}`"))?;
            }
            Stmt::Word(values) => {
                for v in values {
                    let w = Self::imm(v)?;
                    let w = u32::try_from(w)
                        .or_else(|_| i32::try_from(w).map(|w| w as u32))
                        .map_err(|_| anyhow!(".word value out of range: {v}"))?;
                    self.asm.data(w);
                }
            }
            Stmt::Instr { mnemonic, operands } => {
                if self.pseudo(mnemonic, operands)? {
                    return Ok(());
                }
                let desc = lookup(mnemonic).ok_or_else(|| anyhow!("unknown mnemonic: {mnemonic}"))?;
                let ops = operands
                    .iter()
                    .map(|o| self.operand(o))
                    .collect::<Result<Vec<_>>>()?;
                self.asm.emit_desc(desc, &ops)?;
            }
        }
        Ok(())
    }

    /// Rewrites label errors so they carry the source name.
    fn describe(&self, err: AsmError) -> anyhow::Error {
        let named = |l: Label| self.asm.labels().name(l).unwrap_or("?").to_string();
        match err {
            AsmError::LabelNotAssigned { label } => {
                anyhow!("undefined label `{}`", named(label))
            }
            AsmError::LabelAlreadyAssigned { label, address } => {
                anyhow!("label `{}` already defined at {address:#010x}", named(label))
            }
            other => other.into(),
        }
    }

    /// Assembles one source line. Errors carry the line number and text.
    pub fn line(&mut self, text: &str) -> Result<()> {
        self.lines.push(text.trim().to_string());
        let no = self.lines.len();
        let ctx = || format!("line {no}: {}", text.trim());
        let stmts = parse_line(text).with_context(ctx)?;
        for stmt in &stmts {
            self.statement(stmt).with_context(ctx)?;
        }
        let emitted = self.asm.records().len() - self.origin.len();
        self.origin.extend(std::iter::repeat(no).take(emitted));
        Ok(())
    }

    /// Runs the resolve pass. A failure is attributed to the line that
    /// emitted the offending record.
    pub fn finish(self) -> Result<Program> {
        debug!(
            words = self.asm.records().len(),
            labels = self.labels.len(),
            unplaced = self.asm.labels().unresolved().count(),
            "source parsed"
        );
        self.asm.finalize_indexed().map_err(|(i, e)| {
            let err = self.describe(e);
            match self.origin.get(i) {
                Some(&no) => err.context(format!("line {no}: {}", self.lines[no - 1])),
                None => err,
            }
        })
    }
}

pub fn assemble_source(text: &str, cfg: AssemblerConfig) -> Result<Program> {
    let mut src = SourceAssembler::new(cfg);
    for line in text.lines() {
        src.line(line)?;
    }
    src.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mips_asm::Endianness;
    use pretty_assertions::assert_eq;

    fn big() -> AssemblerConfig {
        AssemblerConfig {
            start_pc: 0,
            endianness: Endianness::Big,
        }
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_num("0x10"), Some(16));
        assert_eq!(parse_num("-0X8000"), Some(-0x8000));
        assert_eq!(parse_num("42"), Some(42));
        assert_eq!(parse_num("0xFFFF_FFFF"), Some(0xFFFF_FFFF));
        assert_eq!(parse_num("loop"), None);
        assert_eq!(parse_num("--5"), None);
        assert_eq!(parse_num("-+5"), None);
        assert_eq!(parse_num("0x-5"), None);
    }

    #[test]
    fn line_splitting() {
        assert_eq!(parse_line("   # only a comment").unwrap(), vec![]);
        assert_eq!(
            parse_line("loop: addiu $t0, $t0, -1 ; dec").unwrap(),
            vec![
                Stmt::Label("loop".into()),
                Stmt::Instr {
                    mnemonic: "addiu".into(),
                    operands: vec!["$t0".into(), "$t0".into(), "-1".into()],
                }
            ]
        );
        assert_eq!(
            parse_line(".word 1, 0x2").unwrap(),
            vec![Stmt::Word(vec!["1".into(), "0x2".into()])]
        );
        assert!(parse_line("add $t0,, $t1").is_err());
        assert!(parse_line("1bad: nop").is_err());
    }

    #[test]
    fn assembles_program_with_forward_and_backward_labels() {
        let text = "
            # count down from 3
                li    $t0, 3
            loop:
                addiu $t0, $t0, -1
                bne   $t0, $zero, loop
                nop
                beq   $zero, $zero, done
                nop
                .word 0xDEADBEEF
            done:
                jr    $ra
                nop
        ";
        let p = assemble_source(text, big()).unwrap();
        assert_eq!(
            p.words(),
            &[
                0x3408_0003,
                0x2508_FFFF,
                0x1500_FFFE,
                0,
                0x1000_0002,
                0,
                0xDEAD_BEEF,
                0x03E0_0008,
                0,
            ]
        );
    }

    #[test]
    fn memory_fp_and_pseudo_forms() {
        let text = "
            lw    $s0, 0xCD($a0)
            sw    $ra, ($sp)
            lwc1  $f2, 8($sp)
            add.s $f0, $f1, $f2
            la    $t0, 0x12345678
            move  $t0, $t1
            syscall
        ";
        let p = assemble_source(text, big()).unwrap();
        assert_eq!(
            p.words(),
            &[
                0x8C90_00CD,
                0xAFBF_0000,
                0xC7A2_0008,
                0x4602_0800,
                0x3C08_1234,
                0x3508_5678,
                0x0120_4021,
                0x0000_000C,
            ]
        );
    }

    #[test]
    fn undefined_label_is_named() {
        let err = assemble_source("nop\nb nowhere\nnop", big()).unwrap_err();
        assert_eq!(err.to_string(), "line 2: b nowhere");
        assert!(format!("{err:#}").contains("undefined label `nowhere`"));
    }

    #[test]
    fn finalize_errors_report_line() {
        let err = assemble_source("nop\nli $t0, 0x12345\nnop", big()).unwrap_err();
        assert_eq!(err.to_string(), "line 2: li $t0, 0x12345");
        assert!(format!("{err:#}").contains("immediate value is too big: 0x12345"));

        // both words of `la` map back to its line
        let err = assemble_source("la $t0, far\nnop\n", big()).unwrap_err();
        assert_eq!(err.to_string(), "line 1: la $t0, far");
    }

    #[test]
    fn pseudo_label_operand_must_be_a_name() {
        let err = assemble_source("b $t0", big()).unwrap_err();
        assert_eq!(err.to_string(), "line 1: b $t0");
        assert!(format!("{err:#}").contains("expected label, got \"$t0\""));
        assert!(assemble_source("blt $t0, $t1, 12", big()).is_err());
    }

    #[test]
    fn duplicate_label_reports_line() {
        let err = assemble_source("a:\nnop\na:\n", big()).unwrap_err();
        assert_eq!(err.to_string(), "line 3: a:");
        assert!(format!("{err:#}").contains("already defined at 0x00000000"));
    }

    #[test]
    fn bad_jump_reports_line() {
        let cfg = AssemblerConfig {
            start_pc: 0x0896_D6E4,
            endianness: Endianness::Big,
        };
        let err = assemble_source("nop\nj 0x08FD23A1", cfg).unwrap_err();
        assert_eq!(err.to_string(), "line 2: j 0x08FD23A1");
        assert!(format!("{err:#}").contains("not word aligned"));
    }

    #[test]
    fn unknown_mnemonic() {
        let err = assemble_source("frobnicate $t0", big()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown mnemonic: frobnicate"));
    }
}
