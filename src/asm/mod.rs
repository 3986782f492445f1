//! Assembler and disassembler for Hack programs.
//!
//! This module provides:
//! - A predefined symbol table with variable allocation
//! - A single-line instruction encoder
//! - A two-pass whole-program assembler with labels
//! - A disassembler (words to readable text)

pub mod symbols;
pub mod encoder;
pub mod assembler;
pub mod disasm;

pub use symbols::SymbolTable;
pub use encoder::encode;
pub use assembler::{assemble, AssemblerError, Program};
pub use disasm::{disassemble, disassemble_word};
