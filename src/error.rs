//! Error taxonomy shared by the codec, the ALU and the assembler.
//!
//! Every failure is either a [`RangeError`] (a value does not fit the field
//! it is headed for) or a [`SyntaxError`] (mnemonic text has no recognized
//! shape). Both are raised before any state is touched.

use thiserror::Error;

/// A value exceeds the width of the field or store it targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// A-instruction operand does not fit in 15 bits.
    #[error("A-instruction value {0} out of range (0-32767)")]
    AddressOperand(u64),

    /// Instruction word does not fit in 16 bits.
    #[error("instruction value {0} overflows 16 bits")]
    Word(u32),

    /// ALU operand does not fit in 16 bits.
    #[error("ALU input out of range: x={x}, y={y}")]
    AluInput { x: u32, y: u32 },

    /// Program does not fit in ROM from the requested start address.
    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },
}

/// Mnemonic text does not match any instruction shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("cannot parse A-instruction target: {0:?}")]
    AddressOperand(String),

    #[error("cannot parse C-instruction computation: {0:?}")]
    Computation(String),

    #[error("cannot parse C-instruction destination: {0:?}")]
    Destination(String),

    #[error("cannot parse C-instruction jump: {0:?}")]
    Jump(String),

    #[error("malformed instruction: {0:?}")]
    Malformed(String),
}

/// Failure to turn one line of mnemonic text into a word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("range error: {0}")]
    Range(#[from] RangeError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl EncodeError {
    /// Whether this is a range failure.
    pub fn is_range(&self) -> bool {
        matches!(self, EncodeError::Range(_))
    }

    /// Whether this is a syntax failure.
    pub fn is_syntax(&self) -> bool {
        matches!(self, EncodeError::Syntax(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_kind() {
        let range: EncodeError = RangeError::AddressOperand(32768).into();
        assert!(range.is_range());
        assert!(!range.is_syntax());

        let syntax: EncodeError = SyntaxError::Jump("JXX".into()).into();
        assert!(syntax.is_syntax());
        assert!(!syntax.is_range());
    }

    #[test]
    fn test_messages() {
        let err = EncodeError::from(RangeError::AddressOperand(40000));
        assert_eq!(
            err.to_string(),
            "range error: A-instruction value 40000 out of range (0-32767)"
        );
        let err = SyntaxError::Computation("D+Q".into());
        assert_eq!(err.to_string(), "cannot parse C-instruction computation: \"D+Q\"");
    }
}
