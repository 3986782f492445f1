//! Single-instruction encoder.
//!
//! Syntax:
//! ```text
//! @17          ; A-instruction with a decimal value
//! @counter     ; A-instruction with a symbol (letters and underscores)
//! D=D+1        ; C-instruction: dest=comp
//! D;JGT        ; C-instruction: comp;jump
//! AM=M-1;JNE   ; C-instruction: dest=comp;jump
//! ```

use crate::asm::symbols::SymbolTable;
use crate::cpu::decode::Jump;
use crate::error::{EncodeError, RangeError, SyntaxError};

/// Largest value an A-instruction can carry.
pub const MAX_ADDRESS_VALUE: u64 = (1 << 15) - 1;

/// Computation mnemonics and their 7-bit codes (`a cccccc`).
pub const COMP_TABLE: [(&str, u8); 28] = [
    ("0", 0b0101010),
    ("1", 0b0111111),
    ("-1", 0b0111010),
    ("D", 0b0001100),
    ("A", 0b0110000),
    ("!D", 0b0001101),
    ("!A", 0b0110001),
    ("-D", 0b0001111),
    ("-A", 0b0110011),
    ("D+1", 0b0011111),
    ("A+1", 0b0110111),
    ("D-1", 0b0001110),
    ("A-1", 0b0110010),
    ("D+A", 0b0000010),
    ("D-A", 0b0010011),
    ("A-D", 0b0000111),
    ("D&A", 0b0000000),
    ("D|A", 0b0010101),
    ("M", 0b1110000),
    ("!M", 0b1110001),
    ("-M", 0b1110011),
    ("M+1", 0b1110111),
    ("M-1", 0b1110010),
    ("D+M", 0b1000010),
    ("D-M", 0b1010011),
    ("M-D", 0b1000111),
    ("D&M", 0b1000000),
    ("D|M", 0b1010101),
];

/// Look up the 7-bit code of a computation mnemonic.
pub fn comp_code(mnemonic: &str) -> Option<u8> {
    COMP_TABLE
        .iter()
        .find(|(name, _)| *name == mnemonic)
        .map(|&(_, code)| code)
}

/// Look up the mnemonic for a 7-bit computation code.
pub fn comp_mnemonic(code: u8) -> Option<&'static str> {
    COMP_TABLE
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(name, _)| name)
}

/// Encode one line of mnemonic text into a 16-bit word.
///
/// Symbolic A-instruction operands are resolved (and allocated if new)
/// through `symbols`. The text must not contain whitespace; a name whose
/// allocation would not fit in 15 bits is a range error and is not recorded.
pub fn encode(text: &str, symbols: &mut SymbolTable) -> Result<u16, EncodeError> {
    match text.strip_prefix('@') {
        Some(target) => encode_address(target, symbols),
        None => encode_compute(text),
    }
}

fn encode_address(target: &str, symbols: &mut SymbolTable) -> Result<u16, EncodeError> {
    let value: u64 = if is_decimal(target) {
        // All digits, so the only possible parse failure is overflow.
        target
            .parse()
            .map_err(|_| RangeError::AddressOperand(u64::MAX))?
    } else if is_symbol(target) {
        symbols
            .try_allocate(target, MAX_ADDRESS_VALUE as u32)
            .map_err(|addr| RangeError::AddressOperand(addr as u64))? as u64
    } else {
        return Err(SyntaxError::AddressOperand(target.to_string()).into());
    };

    if value > MAX_ADDRESS_VALUE {
        return Err(RangeError::AddressOperand(value).into());
    }
    Ok(value as u16)
}

fn encode_compute(text: &str) -> Result<u16, EncodeError> {
    let dest_idx = text.find('=');
    let jump_idx = text.find(';');

    if let (Some(d), Some(j)) = (dest_idx, jump_idx) {
        if j < d {
            return Err(SyntaxError::Malformed(text.to_string()).into());
        }
    }

    let dest = dest_idx.map(|d| &text[..d]);
    let comp_start = dest_idx.map_or(0, |d| d + 1);
    let comp_end = jump_idx.unwrap_or(text.len());
    let comp = &text[comp_start..comp_end];
    let jump = jump_idx.map(|j| &text[j + 1..]);

    let comp_bits = comp_code(comp)
        .ok_or_else(|| SyntaxError::Computation(comp.to_string()))?;
    let dest_bits = match dest {
        Some(dest) => dest_mask(dest)?,
        None => 0,
    };
    let jump_bits = match jump {
        Some(jump) => Jump::from_mnemonic(jump)
            .ok_or_else(|| SyntaxError::Jump(jump.to_string()))?
            .bits(),
        None => 0,
    };

    Ok(0b111 << 13
        | (comp_bits as u16) << 6
        | (dest_bits as u16) << 3
        | jump_bits as u16)
}

/// Build the destination mask. Letters may repeat and come in any order.
fn dest_mask(dest: &str) -> Result<u8, SyntaxError> {
    if dest.is_empty() {
        return Err(SyntaxError::Destination(dest.to_string()));
    }

    let mut mask = 0;
    for ch in dest.chars() {
        mask |= match ch {
            'A' => 0b100,
            'D' => 0b010,
            'M' => 0b001,
            _ => return Err(SyntaxError::Destination(dest.to_string())),
        };
    }
    Ok(mask)
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `s` can name a symbol: letters and underscores only.
pub fn is_symbol(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{decode, Compute, Dest, Instruction};
    use proptest::prelude::*;

    fn enc(text: &str) -> Result<u16, EncodeError> {
        encode(text, &mut SymbolTable::new())
    }

    #[test]
    fn test_literal_address() {
        assert_eq!(enc("@0"), Ok(0));
        assert_eq!(enc("@5"), Ok(5));
        assert_eq!(enc("@32767"), Ok(32767));
        assert_eq!(enc("@007"), Ok(7));
    }

    #[test]
    fn test_address_range() {
        assert_eq!(
            enc("@32768"),
            Err(EncodeError::Range(RangeError::AddressOperand(32768)))
        );
        assert!(enc("@99999999999999999999999").unwrap_err().is_range());
    }

    #[test]
    fn test_symbolic_address() {
        let mut symbols = SymbolTable::new();
        assert_eq!(encode("@i", &mut symbols), Ok(16));
        assert_eq!(encode("@sum", &mut symbols), Ok(17));
        assert_eq!(encode("@i", &mut symbols), Ok(16));
        assert_eq!(encode("@SCREEN", &mut symbols), Ok(16384));
        // Digits are not allowed in symbolic operands
        assert!(encode("@R0", &mut symbols).unwrap_err().is_syntax());
        assert_eq!(encode("@SP", &mut symbols), Ok(0));
    }

    #[test]
    fn test_address_syntax() {
        for bad in ["@", "@-1", "@12ab", "@foo.bar", "@x1"] {
            let err = enc(bad).unwrap_err();
            assert!(err.is_syntax(), "{} should be a syntax error", bad);
        }
    }

    #[test]
    fn test_every_computation() {
        let expected: [(&str, u16); 28] = [
            ("0", 0b0101010),
            ("1", 0b0111111),
            ("-1", 0b0111010),
            ("D", 0b0001100),
            ("A", 0b0110000),
            ("!D", 0b0001101),
            ("!A", 0b0110001),
            ("-D", 0b0001111),
            ("-A", 0b0110011),
            ("D+1", 0b0011111),
            ("A+1", 0b0110111),
            ("D-1", 0b0001110),
            ("A-1", 0b0110010),
            ("D+A", 0b0000010),
            ("D-A", 0b0010011),
            ("A-D", 0b0000111),
            ("D&A", 0b0000000),
            ("D|A", 0b0010101),
            ("M", 0b1110000),
            ("!M", 0b1110001),
            ("-M", 0b1110011),
            ("M+1", 0b1110111),
            ("M-1", 0b1110010),
            ("D+M", 0b1000010),
            ("D-M", 0b1010011),
            ("M-D", 0b1000111),
            ("D&M", 0b1000000),
            ("D|M", 0b1010101),
        ];
        for (mnemonic, code) in expected {
            assert_eq!(enc(mnemonic), Ok(0b111 << 13 | code << 6), "{}", mnemonic);
        }
    }

    #[test]
    fn test_table_codes_are_well_formed() {
        for &(mnemonic, code) in COMP_TABLE.iter() {
            let word = enc(mnemonic).unwrap();
            assert_eq!(word >> 13, 0b111, "{}", mnemonic);
            assert_eq!(((word >> 6) & 0x7F) as u8, code, "{}", mnemonic);
            assert_eq!(word & 0b111111, 0, "{}", mnemonic);
        }
    }

    #[test]
    fn test_d_and_a_has_zero_code() {
        assert_eq!(enc("D&A"), Ok(0b1110_0000_0000_0000));
        assert_eq!(enc("M=D&A"), Ok(0b1110_0000_0000_1000));
    }

    #[test]
    fn test_dest_and_comp() {
        let word = enc("D=D+1").unwrap();
        assert_eq!(word, 0b1110_0111_1101_0000);
        assert_eq!(
            decode(word as u32).unwrap(),
            Instruction::Compute(Compute {
                memory: false,
                comp: 0b011111,
                dest: Dest::D,
                jump: Jump::Never,
            })
        );
    }

    #[test]
    fn test_dest_letters_any_order() {
        assert_eq!(enc("AMD=0"), enc("DMA=0"));
        assert_eq!(enc("MM=1").unwrap() & 0b111000, 0b001000);
        assert_eq!(enc("AMD=0").unwrap() & 0b111000, 0b111000);
    }

    #[test]
    fn test_jumps() {
        assert_eq!(enc("0;JMP"), Ok(0b1110_1010_1000_0111));
        assert_eq!(enc("D;JGT").unwrap() & 0b111, 1);
        assert_eq!(enc("D;JLE").unwrap() & 0b111, 6);
        assert_eq!(enc("AM=M-1;JNE"), Ok(0b1111_1100_1010_1101));
    }

    #[test]
    fn test_compute_syntax() {
        for bad in [
            "D=D+Q",
            "AD=1;JXX",
            "X=D",
            "=D",
            "D;",
            "D;JMP=A",
            "",
            "D = A",
            "A+D",
        ] {
            let err = enc(bad).unwrap_err();
            assert!(err.is_syntax(), "{:?} should be a syntax error", bad);
        }
    }

    #[test]
    fn test_failed_encode_allocates_nothing() {
        let mut symbols = SymbolTable::new();
        assert!(encode("@bad-name", &mut symbols).is_err());
        assert_eq!(symbols.next_allocation(), 16);
    }

    /// Distinct letters-only name for each index.
    fn letters(mut n: usize) -> String {
        let mut name = String::new();
        loop {
            name.push((b'a' + (n % 26) as u8) as char);
            n /= 26;
            if n == 0 {
                return name;
            }
        }
    }

    #[test]
    fn test_exhausted_variable_space_allocates_nothing() {
        let mut symbols = SymbolTable::new();
        let mut n = 0;
        let err = loop {
            match encode(&format!("@{}", letters(n)), &mut symbols) {
                Ok(_) => n += 1,
                Err(e) => break e,
            }
        };
        assert_eq!(err, EncodeError::Range(RangeError::AddressOperand(32768)));

        let failed = letters(n);
        assert_eq!(symbols.get(&failed), None);
        assert_eq!(symbols.next_allocation(), 32768);
        // Still refused, still not recorded
        assert!(encode(&format!("@{}", failed), &mut symbols).unwrap_err().is_range());
        assert_eq!(symbols.get(&failed), None);
        // Names already allocated keep resolving
        assert_eq!(encode("@a", &mut symbols), Ok(16));
    }

    #[test]
    fn test_surrounding_whitespace_is_rejected() {
        for bad in [" @5", "@5 ", " D=A", "D=A\t"] {
            assert!(enc(bad).unwrap_err().is_syntax(), "{:?} should be a syntax error", bad);
        }
    }

    #[test]
    fn test_comp_lookup_both_ways() {
        assert_eq!(comp_code("D+M"), Some(0b1000010));
        assert_eq!(comp_mnemonic(0b1000010), Some("D+M"));
        assert_eq!(comp_code("M+D"), None);
    }

    proptest! {
        #[test]
        fn prop_address_roundtrip(v in 0u16..=32767) {
            let word = enc(&format!("@{}", v)).unwrap();
            prop_assert_eq!(decode(word as u32).unwrap(), Instruction::Address { value: v });
        }
    }
}
