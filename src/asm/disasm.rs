//! Disassembler for Hack programs.
//!
//! Converts instruction words back to readable assembly.

use crate::asm::encoder::comp_mnemonic;
use crate::cpu::decode::{Compute, Instruction};
use std::fmt;

/// Disassemble a single instruction word to text.
pub fn disassemble_word(word: u16) -> String {
    let instr = Instruction::from(word);
    match format_instruction(&instr) {
        Some(text) => text,
        None => format!("??? ; {:016b}", word),
    }
}

/// Disassemble a slice of words as an address / binary / text listing.
pub fn disassemble(words: &[u16]) -> String {
    let mut output = String::new();
    output.push_str("// Hack Disassembly\n");
    output.push_str("// ----------------\n\n");

    for (addr, &word) in words.iter().enumerate() {
        let line = disassemble_word(word);
        output.push_str(&format!("{:05}: {:016b}  {}\n", addr, word, line));
    }

    output
}

/// Format a decoded instruction, or `None` for an unknown computation.
fn format_instruction(instr: &Instruction) -> Option<String> {
    match instr {
        Instruction::Address { value } => Some(format!("@{}", value)),
        Instruction::Compute(c) => format_compute(c),
    }
}

fn format_compute(c: &Compute) -> Option<String> {
    let comp = comp_mnemonic(c.comp7())?;
    let mut text = String::new();

    if !c.dest.is_empty() {
        if c.dest.a() {
            text.push('A');
        }
        if c.dest.d() {
            text.push('D');
        }
        if c.dest.m() {
            text.push('M');
        }
        text.push('=');
    }
    text.push_str(comp);
    if let Some(jump) = c.jump.mnemonic() {
        text.push(';');
        text.push_str(jump);
    }

    Some(text)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_instruction(self) {
            Some(text) => f.write_str(&text),
            None => write!(f, "??? ; {:016b}", crate::cpu::encode(self)),
        }
    }
}
