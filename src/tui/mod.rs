//! TUI debugger for the Hack emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register view (A, D, PC, M, cycles, wiring)
//! - RAM view with the cell under A highlighted
//! - Step/run/breakpoint controls
//! - Disassembly view around PC

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
