use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Byte order of the produced image. Encoding itself is always MSB first; the
/// order is applied to each finished word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Reinterprets a packed word so that writing it MSB first yields this
    /// byte order.
    #[inline]
    pub fn apply(self, word: u32) -> u32 {
        match self {
            Endianness::Big => word,
            Endianness::Little => word.swap_bytes(),
        }
    }
}

/// Output of a finalized assembly. `words` are already in output byte order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub start_pc: u32,
    pub endianness: Endianness,
    pub words: Vec<u32>,
}

impl Program {
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Address just past the last word.
    pub fn end_pc(&self) -> u32 {
        self.start_pc.wrapping_add((self.words.len() as u32).wrapping_mul(4))
    }

    /// Eight uppercase hex digits per word, no separators.
    pub fn to_hex_string(&self) -> String {
        let mut out = String::with_capacity(self.words.len() * 8);
        for w in &self.words {
            let _ = write!(out, "{w:08X}");
        }
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.words.len() * 4);
        for w in &self.words {
            out.extend_from_slice(&w.to_be_bytes());
        }
        out
    }

    /// `address: word` lines, one per instruction.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        let mut pc = self.start_pc;
        for w in &self.words {
            let _ = writeln!(out, "{pc:#010x}: {w:08X}");
            pc = pc.wrapping_add(4);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn program(endianness: Endianness, raw: &[u32]) -> Program {
        Program {
            start_pc: 0,
            endianness,
            words: raw.iter().map(|w| endianness.apply(*w)).collect(),
        }
    }

    #[test]
    fn little_endian_word() {
        let p = program(Endianness::Little, &[0x1122_3344]);
        assert_eq!(p.words(), &[0x4433_2211]);
        assert_eq!(p.to_bytes(), vec![0x44, 0x33, 0x22, 0x11]);
        assert_eq!(p.to_hex_string(), "44332211");
    }

    #[test]
    fn big_endian_word() {
        let p = program(Endianness::Big, &[0x1122_3344]);
        assert_eq!(p.to_bytes(), vec![0x11, 0x22, 0x33, 0x44]);
        assert_eq!(p.to_hex_string(), "11223344");
    }

    #[test]
    fn hex_is_uppercase_and_padded() {
        let p = program(Endianness::Big, &[0, 0xCDCD_CDCD, 0xFFFF_FFFF]);
        assert_eq!(p.to_hex_string(), "00000000CDCDCDCDFFFFFFFF");
    }

    #[test]
    fn listing_and_end_pc() {
        let mut p = program(Endianness::Big, &[0x2408_0001, 0]);
        p.start_pc = 0x8000_0000;
        assert_eq!(p.end_pc(), 0x8000_0008);
        assert_eq!(p.listing(), "0x80000000: 24080001\n0x80000004: 00000000\n");
    }
}
