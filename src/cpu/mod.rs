//! CPU emulation for the Hack computer.
//!
//! This module implements the Hack architecture:
//! - 64K sixteen-bit ROM cells for instructions
//! - 64K sixteen-bit RAM cells for data
//! - 3 registers: A (address), D (data), PC (program counter)
//! - two instruction kinds: A (load value) and C (compute/store/jump)

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;

pub use memory::{DataMemory, Ram, Rom, MEMORY_SIZE};
pub use registers::Registers;
pub use decode::{decode, encode, Compute, Dest, Instruction, Jump};
pub use execute::{Cpu, Snapshot, Wiring};
