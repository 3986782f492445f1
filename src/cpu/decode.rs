//! Instruction decoder for the Hack CPU.
//!
//! Every instruction is one 16-bit word. Bit 15 selects the kind:
//! - `0vvv vvvv vvvv vvvv`: A-instruction, 15-bit value
//! - `1xxa cccc ccdd djjj`: C-instruction, memory-select `a`, computation
//!   `cccccc`, destination `ddd`, jump `jjj`

use crate::error::RangeError;
use serde::{Serialize, Deserialize};

/// 3-bit destination mask: bit 2 = A, bit 1 = D, bit 0 = M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dest(u8);

impl Dest {
    pub const NONE: Dest = Dest(0);
    pub const A: Dest = Dest(0b100);
    pub const D: Dest = Dest(0b010);
    pub const M: Dest = Dest(0b001);

    /// Create from the low 3 bits.
    pub const fn from_bits(bits: u8) -> Self {
        Dest(bits & 0b111)
    }

    /// The raw 3-bit mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the result is stored in A.
    pub const fn a(self) -> bool {
        self.0 & 0b100 != 0
    }

    /// Whether the result is stored in D.
    pub const fn d(self) -> bool {
        self.0 & 0b010 != 0
    }

    /// Whether the result is stored in RAM[A].
    pub const fn m(self) -> bool {
        self.0 & 0b001 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Dest {
    type Output = Dest;

    fn bitor(self, rhs: Dest) -> Dest {
        Dest(self.0 | rhs.0)
    }
}

/// Branch condition, evaluated against the computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Jump {
    /// Never jump (0b000).
    #[default]
    Never,
    /// Jump if > 0 (0b001).
    Jgt,
    /// Jump if = 0 (0b010).
    Jeq,
    /// Jump if >= 0 (0b011).
    Jge,
    /// Jump if < 0 (0b100).
    Jlt,
    /// Jump if != 0 (0b101).
    Jne,
    /// Jump if <= 0 (0b110).
    Jle,
    /// Always jump (0b111).
    Jmp,
}

impl Jump {
    /// Create from the low 3 bits.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Jump::Never,
            1 => Jump::Jgt,
            2 => Jump::Jeq,
            3 => Jump::Jge,
            4 => Jump::Jlt,
            5 => Jump::Jne,
            6 => Jump::Jle,
            _ => Jump::Jmp,
        }
    }

    /// The 3-bit jump code.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Parse a jump mnemonic such as `JGT`.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s {
            "JGT" => Some(Jump::Jgt),
            "JEQ" => Some(Jump::Jeq),
            "JGE" => Some(Jump::Jge),
            "JLT" => Some(Jump::Jlt),
            "JNE" => Some(Jump::Jne),
            "JLE" => Some(Jump::Jle),
            "JMP" => Some(Jump::Jmp),
            _ => None,
        }
    }

    /// The mnemonic, or `None` for [`Jump::Never`].
    pub const fn mnemonic(self) -> Option<&'static str> {
        match self {
            Jump::Never => None,
            Jump::Jgt => Some("JGT"),
            Jump::Jeq => Some("JEQ"),
            Jump::Jge => Some("JGE"),
            Jump::Jlt => Some("JLT"),
            Jump::Jne => Some("JNE"),
            Jump::Jle => Some("JLE"),
            Jump::Jmp => Some("JMP"),
        }
    }

    /// Whether the branch is taken for `value`, read as two's complement.
    pub const fn taken(self, value: u16) -> bool {
        let v = value as i16;
        match self {
            Jump::Never => false,
            Jump::Jgt => v > 0,
            Jump::Jeq => v == 0,
            Jump::Jge => v >= 0,
            Jump::Jlt => v < 0,
            Jump::Jne => v != 0,
            Jump::Jle => v <= 0,
            Jump::Jmp => true,
        }
    }
}

/// Fields of a C-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Compute {
    /// Memory-select bit (bit 12): operate on RAM[A] instead of A.
    pub memory: bool,
    /// 6-bit computation code (bits 11..6).
    pub comp: u8,
    /// Destination mask (bits 5..3).
    pub dest: Dest,
    /// Jump code (bits 2..0).
    pub jump: Jump,
}

impl Compute {
    /// The 7-bit computation code with the memory-select bit on top.
    pub const fn comp7(&self) -> u8 {
        (self.memory as u8) << 6 | self.comp
    }
}

/// Decoded Hack instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Instruction {
    /// Load a 15-bit value into A: `@value`
    #[serde(rename = "A")]
    Address { value: u16 },

    /// Compute, store and maybe jump: `dest=comp;jump`
    #[serde(rename = "C")]
    Compute(Compute),
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        if word >> 15 == 0 {
            Instruction::Address { value: word & 0x7FFF }
        } else {
            Instruction::Compute(Compute {
                memory: (word >> 12) & 0b1 != 0,
                comp: ((word >> 6) & 0b111111) as u8,
                dest: Dest::from_bits(((word >> 3) & 0b111) as u8),
                jump: Jump::from_bits((word & 0b111) as u8),
            })
        }
    }
}

impl From<Instruction> for u16 {
    fn from(instr: Instruction) -> u16 {
        encode(&instr)
    }
}

/// Decode an instruction word held in a wider integer.
///
/// Fails if the value does not fit in 16 bits.
pub fn decode(word: u32) -> Result<Instruction, RangeError> {
    let word = u16::try_from(word).map_err(|_| RangeError::Word(word))?;
    Ok(Instruction::from(word))
}

/// Pack an instruction back into its 16-bit word.
///
/// C-instructions always get both unused high bits set, as the assembler
/// emits them.
pub fn encode(instr: &Instruction) -> u16 {
    match instr {
        Instruction::Address { value } => value & 0x7FFF,
        Instruction::Compute(c) => {
            0b111 << 13
                | (c.comp7() as u16) << 6
                | (c.dest.bits() as u16) << 3
                | c.jump.bits() as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_address() {
        assert_eq!(Instruction::from(5), Instruction::Address { value: 5 });
        assert_eq!(
            Instruction::from(0x7FFF),
            Instruction::Address { value: 32767 }
        );
    }

    #[test]
    fn test_decode_compute() {
        // D=D+A
        let instr = Instruction::from(0b1110_0000_1001_0000);
        assert_eq!(
            instr,
            Instruction::Compute(Compute {
                memory: false,
                comp: 0b000010,
                dest: Dest::D,
                jump: Jump::Never,
            })
        );

        // AM=M+1;JNE
        let instr = Instruction::from(0b1111_1101_1110_1101);
        let Instruction::Compute(c) = instr else { panic!("expected C-instruction") };
        assert!(c.memory);
        assert_eq!(c.comp, 0b110111);
        assert_eq!(c.dest, Dest::A | Dest::M);
        assert_eq!(c.jump, Jump::Jne);
    }

    #[test]
    fn test_decode_range() {
        assert!(decode(65535).is_ok());
        assert_eq!(decode(1 << 16), Err(RangeError::Word(65536)));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for word in [0u16, 1, 0x7FFF, 0xEC10, 0xE308, 0xFDE7, 0xEA87] {
            assert_eq!(encode(&Instruction::from(word)), word);
        }
    }

    #[test]
    fn test_dest_bits() {
        let dest = Dest::from_bits(0b111);
        assert!(dest.a() && dest.d() && dest.m());
        assert!(Dest::NONE.is_empty());
        assert!(!Dest::D.a() && Dest::D.d() && !Dest::D.m());
    }

    #[test]
    fn test_jump_table() {
        for bits in 0..8 {
            assert_eq!(Jump::from_bits(bits).bits(), bits);
        }

        assert!(!Jump::Never.taken(0));
        assert!(Jump::Jmp.taken(0) && Jump::Jmp.taken(0x8000));
        assert!(Jump::Jeq.taken(0) && !Jump::Jeq.taken(1));
        assert!(Jump::Jgt.taken(1) && !Jump::Jgt.taken(0xFFFF));
        assert!(Jump::Jlt.taken(0xFFFF) && !Jump::Jlt.taken(0));
        assert!(Jump::Jge.taken(0) && !Jump::Jge.taken(0x8000));
        assert!(Jump::Jle.taken(0) && Jump::Jle.taken(0x8000) && !Jump::Jle.taken(1));
        assert!(Jump::Jne.taken(7) && !Jump::Jne.taken(0));
    }

    #[test]
    fn test_jump_mnemonics() {
        for bits in 1..8 {
            let jump = Jump::from_bits(bits);
            let name = jump.mnemonic().unwrap();
            assert_eq!(Jump::from_mnemonic(name), Some(jump));
        }
        assert_eq!(Jump::Never.mnemonic(), None);
        assert_eq!(Jump::from_mnemonic("JXX"), None);
    }
}
