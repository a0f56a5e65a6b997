use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mips_asm::{AssemblerConfig, Endianness, Program};
use mips_asm_cli::assemble_source;

#[derive(Parser, Debug)]
#[command(author, version, about = "MIPS32 assembler CLI", long_about = None)]
struct Cli {
    /// Assembly source file
    #[arg(value_name = "INPUT")]
    input: String,
    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,
    /// Address of the first instruction (hex or dec)
    #[arg(long, value_name = "ADDR", value_parser = parse_u32)]
    start: Option<u32>,
    /// Byte order of the emitted words
    #[arg(long, value_enum)]
    endian: Option<Endian>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Hex)]
    format: OutputFormat,
    /// JSON assembler config ({ "start_pc": .., "endianness": "big" }); flags win
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Endian {
    Little,
    Big,
}

impl From<Endian> for Endianness {
    fn from(e: Endian) -> Self {
        match e {
            Endian::Little => Endianness::Little,
            Endian::Big => Endianness::Big,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Bin,
    Hex,
    Json,
    Listing,
}

#[derive(Debug, serde::Serialize)]
struct Report<'a> {
    start_pc: u32,
    end_pc: u32,
    endianness: Endianness,
    words: Vec<String>,
    input: &'a str,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(&hex.replace('_', ""), 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

fn load_config(cli: &Cli) -> Result<AssemblerConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str::<AssemblerConfig>(&txt)
                .with_context(|| format!("parsing config {path}"))?
        }
        None => AssemblerConfig::default(),
    };
    if let Some(start) = cli.start {
        cfg.start_pc = start;
    }
    if let Some(e) = cli.endian {
        cfg.endianness = e.into();
    }
    Ok(cfg)
}

fn render(program: &Program, format: OutputFormat, input: &str) -> Result<Vec<u8>> {
    Ok(match format {
        OutputFormat::Bin => program.to_bytes(),
        OutputFormat::Hex => {
            let mut s = program.to_hex_string();
            s.push('\n');
            s.into_bytes()
        }
        OutputFormat::Listing => program.listing().into_bytes(),
        OutputFormat::Json => {
            let report = Report {
                start_pc: program.start_pc,
                end_pc: program.end_pc(),
                endianness: program.endianness,
                words: program.words().iter().map(|w| format!("{w:08X}")).collect(),
                input,
            };
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            json.into_bytes()
        }
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    let text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input))?;

    let program = assemble_source(&text, cfg).with_context(|| cli.input.clone())?;
    info!(
        words = program.len(),
        start = program.start_pc,
        "assembled {}",
        cli.input
    );

    let out = render(&program, cli.format, &cli.input)?;
    match &cli.output {
        Some(path) => std::fs::write(path, out).with_context(|| format!("writing {path}"))?,
        None => std::io::stdout().lock().write_all(&out)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_u32_hex_and_dec() {
        assert_eq!(parse_u32("0x10").unwrap(), 0x10);
        assert_eq!(parse_u32("0xBFC0_0000").unwrap(), 0xBFC0_0000);
        assert_eq!(parse_u32("16").unwrap(), 16);
        assert!(parse_u32("zz").is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let path = std::env::temp_dir().join("_mips_asm_cfg.json");
        std::fs::write(&path, r#"{"start_pc": 4096, "endianness": "big"}"#).unwrap();
        let cli = Cli::parse_from([
            "mips-asm",
            "in.s",
            "--config",
            path.to_str().unwrap(),
            "--endian",
            "little",
        ]);
        let cfg = load_config(&cli).unwrap();
        assert_eq!(cfg.start_pc, 4096);
        assert_eq!(cfg.endianness, Endianness::Little);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn json_report_uses_hex_words() {
        let cfg = AssemblerConfig {
            start_pc: 0x100,
            endianness: Endianness::Big,
        };
        let p = assemble_source("nop\njr $ra", cfg).unwrap();
        let out = render(&p, OutputFormat::Json, "t.s").unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["start_pc"], 0x100);
        assert_eq!(v["end_pc"], 0x108);
        assert_eq!(v["endianness"], "big");
        assert_eq!(v["words"][1], "03E00008");
        assert_eq!(v["input"], "t.s");
    }
}
