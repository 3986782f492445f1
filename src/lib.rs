//! # Hack Emulator
//!
//! An emulator of the 16-bit Hack computer: a two-register machine with a
//! six-control-bit ALU, separate instruction ROM and data RAM, and a tiny
//! assembly language.
//!
//! ```
//! use hack::Cpu;
//!
//! let mut cpu = Cpu::new();
//! for (addr, line) in ["@5", "D=A", "@0", "M=D"].iter().enumerate() {
//!     cpu.load(line, addr as u16).unwrap();
//! }
//! cpu.run(4);
//! assert_eq!(cpu.d(), 5);
//! assert_eq!(cpu.ram().read(0), 5);
//! ```

pub mod error;
pub mod alu;
pub mod cpu;
pub mod asm;
pub mod diag;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use error::{EncodeError, RangeError, SyntaxError};
pub use alu::Controls;
pub use cpu::{Cpu, DataMemory, Instruction, Ram, Registers, Rom, Snapshot, Wiring};
pub use asm::{assemble, disassemble, AssemblerError, Program, SymbolTable};
pub use diag::{DiagnosticSink, Event, Level, NullSink, TracingSink};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
