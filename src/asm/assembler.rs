//! Two-pass assembler for whole Hack programs.
//!
//! Syntax:
//! ```text
//! // Comment
//! (LOOP)          // Define a label at the next instruction's address
//!     @i          // Variable, allocated from RAM[16] on first use
//!     M=M+1       // Compute instruction
//!     @LOOP
//!     0;JMP       // Jump to label
//! ```
//!
//! Whitespace anywhere on a line is ignored.

use crate::asm::encoder::{encode, is_symbol};
use crate::asm::symbols::{SymbolTable, PREDEFINED};
use crate::cpu::MEMORY_SIZE;
use crate::error::{EncodeError, RangeError};
use thiserror::Error;

const COMMENT_BEGIN: &str = "//";
const LABEL_BEGIN: char = '(';
const LABEL_END: char = ')';

/// An assembled program.
#[derive(Debug, Clone)]
pub struct Program {
    /// The instruction words, to be loaded at ROM[0].
    pub words: Vec<u16>,
    /// Cleaned source text of each word.
    pub source: Vec<String>,
    /// Labels and the ROM addresses they mark, in source order.
    pub labels: Vec<(String, u16)>,
    /// The symbol table after assembly.
    pub symbols: SymbolTable,
}

impl Program {
    /// Get the number of instructions.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Variables allocated during assembly, sorted by address.
    pub fn variables(&self) -> Vec<(&str, u32)> {
        let mut vars: Vec<_> = self
            .symbols
            .iter()
            .filter(|&(name, _)| {
                !PREDEFINED.iter().any(|&(p, _)| p == name)
                    && !self.labels.iter().any(|(label, _)| label == name)
            })
            .collect();
        vars.sort_by_key(|&(name, addr)| (addr, name));
        vars
    }
}

/// Assemble source code to a program.
pub fn assemble(source: &str) -> Result<Program, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// A cleaned source line and where it came from.
struct Line {
    number: usize,
    text: String,
}

/// The assembler state.
struct Assembler {
    symbols: SymbolTable,
    labels: Vec<(String, u16)>,
    /// Instruction lines left after pass 1.
    instructions: Vec<Line>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            labels: Vec::new(),
            instructions: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Program, AssemblerError> {
        // Pass 1: Collect labels
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        if self.instructions.len() > MEMORY_SIZE {
            return Err(AssemblerError::TooLarge(RangeError::ProgramTooLarge {
                size: self.instructions.len(),
                available: MEMORY_SIZE,
            }));
        }

        // Pass 2: Encode, allocating variables in order of first use
        let mut words = Vec::with_capacity(self.instructions.len());
        for line in &self.instructions {
            let word = encode(&line.text, &mut self.symbols).map_err(|source| {
                AssemblerError::Encode { line: line.number, source }
            })?;
            words.push(word);
        }

        Ok(Program {
            words,
            source: self.instructions.iter().map(|l| l.text.clone()).collect(),
            labels: self.labels.clone(),
            symbols: self.symbols.clone(),
        })
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        // Remove comments and all whitespace
        let line = match line.find(COMMENT_BEGIN) {
            Some(idx) => &line[..idx],
            None => line,
        };
        let line: String = line.chars().filter(|c| !c.is_whitespace()).collect();

        if line.is_empty() {
            return Ok(());
        }

        if let Some(label) = line
            .strip_prefix(LABEL_BEGIN)
            .and_then(|rest| rest.strip_suffix(LABEL_END))
        {
            if !is_symbol(label) {
                return Err(AssemblerError::InvalidLabel {
                    line: line_num,
                    label: label.to_string(),
                });
            }
            // Saturate: an oversized program is rejected after pass 1 anyway.
            let addr = u16::try_from(self.instructions.len()).unwrap_or(u16::MAX);
            self.symbols
                .define_label(label, addr)
                .map_err(|label| AssemblerError::DuplicateLabel { line: line_num, label })?;
            self.labels.push((label.to_string(), addr));
            return Ok(());
        }

        self.instructions.push(Line { number: line_num, text: line });
        Ok(())
    }
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("line {line}: {source}")]
    Encode { line: usize, source: EncodeError },

    #[error("duplicate label on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("invalid label on line {line}: {label:?}")]
    InvalidLabel { line: usize, label: String },

    #[error("{0}")]
    TooLarge(RangeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxError;

    #[test]
    fn test_assemble_simple() {
        let source = r#"
            // Computes RAM[0] = 2 + 3
            @2
            D=A
            @3
            D=D+A
            @0
            M=D
        "#;

        let program = assemble(source).unwrap();
        assert_eq!(
            program.words,
            vec![
                0b0000000000000010,
                0b1110110000010000,
                0b0000000000000011,
                0b1110000010010000,
                0b0000000000000000,
                0b1110001100001000,
            ]
        );
        assert_eq!(program.source[3], "D=D+A");
    }

    #[test]
    fn test_assemble_with_labels() {
        let source = r#"
            @i
            M=1     // i = 1
        (LOOP)
            @i
            D=M
            @END
            D;JGT
            @LOOP
            0;JMP
        (END)
            @END
            0;JMP
        "#;

        let program = assemble(source).unwrap();
        assert_eq!(program.len(), 10);
        assert_eq!(program.words[0], 16); // @i
        assert_eq!(program.words[4], 8); // @END
        assert_eq!(program.words[6], 2); // @LOOP
        assert_eq!(program.symbols.get("LOOP"), Some(2));
        assert_eq!(program.variables(), vec![("i", 16)]);
        assert_eq!(program.labels, vec![("LOOP".to_string(), 2), ("END".to_string(), 8)]);
    }

    #[test]
    fn test_forward_label_is_not_a_variable() {
        let program = assemble("@END\n@x\n(END)\n@y").unwrap();
        assert_eq!(program.words, vec![2, 16, 17]);
    }

    #[test]
    fn test_whitespace_inside_instruction() {
        let program = assemble("  D = D + 1 ; JGT  ").unwrap();
        assert_eq!(program.source, vec!["D=D+1;JGT".to_string()]);
    }

    #[test]
    fn test_encode_error_has_line() {
        let err = assemble("@1\n\nD=D+Q").unwrap_err();
        assert_eq!(
            err,
            AssemblerError::Encode {
                line: 3,
                source: SyntaxError::Computation("D+Q".into()).into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "line 3: syntax error: cannot parse C-instruction computation: \"D+Q\""
        );
    }

    #[test]
    fn test_label_errors() {
        assert_eq!(
            assemble("(A)\n(A)").unwrap_err(),
            AssemblerError::DuplicateLabel { line: 2, label: "A".into() }
        );
        assert!(matches!(
            assemble("(SCREEN)").unwrap_err(),
            AssemblerError::DuplicateLabel { line: 1, .. }
        ));
        assert!(matches!(
            assemble("(LOOP.1)").unwrap_err(),
            AssemblerError::InvalidLabel { line: 1, .. }
        ));
    }

    #[test]
    fn test_empty_source() {
        let program = assemble("// nothing here\n\n").unwrap();
        assert!(program.is_empty());
    }
}
