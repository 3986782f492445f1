//! Hack CPU registers.
//!
//! The Hack CPU has 3 registers:
//! - A: 16-bit address/data register
//! - D: 16-bit data register
//! - PC: 16-bit program counter

use serde::{Serialize, Deserialize};

/// The Hack register file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A: address register, also usable as data
    pub a: u16,

    /// D: data register
    pub d: u16,

    /// PC: address of the next instruction in ROM
    pub pc: u16,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Increment the program counter by 1, modulo 2^16.
    pub fn advance_pc(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: u16) {
        self.pc = addr;
    }
}
