//! Diagnostic events emitted by the CPU.
//!
//! The CPU reports what it fetched, how it drove the ALU and what state it
//! ended in through a [`DiagnosticSink`]. Sinks are advisory: nothing they
//! do feeds back into execution.
//!
//! [`TracingSink`] forwards every event to `tracing`; any closure
//! `FnMut(Level, &Event)` is also a sink.

use crate::alu::Controls;
use crate::cpu::{Instruction, Registers};
use serde::Serialize;

/// Severity category of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Log,
    Warn,
    Error,
    Trace,
    Debug,
}

/// Something the CPU did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A word was fetched from ROM[pc].
    Fetched { pc: u16, word: u16 },

    /// A C-instruction word without both unused high bits set.
    NonCanonicalWord { pc: u16, word: u16 },

    /// The ALU was evaluated.
    AluEvaluated { x: u16, y: u16, controls: Controls, out: u16 },

    /// An instruction completed.
    Stepped {
        word: u16,
        instruction: Instruction,
        registers: Registers,
        m: u16,
    },

    /// `load` refused a line of text.
    LoadRejected { address: u16, text: String, error: String },
}

impl Event {
    /// The level this event is reported at.
    pub fn level(&self) -> Level {
        match self {
            Event::Fetched { .. } => Level::Trace,
            Event::NonCanonicalWord { .. } => Level::Warn,
            Event::AluEvaluated { .. } => Level::Debug,
            Event::Stepped { .. } => Level::Log,
            Event::LoadRejected { .. } => Level::Error,
        }
    }
}

/// Receiver for diagnostic events.
pub trait DiagnosticSink {
    fn emit(&mut self, level: Level, event: &Event);
}

impl<F: FnMut(Level, &Event)> DiagnosticSink for F {
    fn emit(&mut self, level: Level, event: &Event) {
        self(level, event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _level: Level, _event: &Event) {}
}

/// Forwards events to the `tracing` macros. `Level::Log` maps to `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! at_level {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::Log => tracing::info!($($arg)+),
            Level::Warn => tracing::warn!($($arg)+),
            Level::Error => tracing::error!($($arg)+),
            Level::Trace => tracing::trace!($($arg)+),
            Level::Debug => tracing::debug!($($arg)+),
        }
    };
}

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, level: Level, event: &Event) {
        match event {
            Event::Fetched { pc, word } => {
                let raw = format!("{:016b}", word);
                at_level!(level, pc, raw = raw.as_str(), "CPU tick started");
            }
            Event::NonCanonicalWord { pc, word } => {
                let raw = format!("{:016b}", word);
                at_level!(level, pc, raw = raw.as_str(), "C-instruction with non-canonical high bits");
            }
            Event::AluEvaluated { x, y, controls, out } => {
                at_level!(
                    level,
                    x,
                    y,
                    zx = controls.zx,
                    nx = controls.nx,
                    zy = controls.zy,
                    ny = controls.ny,
                    f = controls.f,
                    no = controls.no,
                    out,
                    "ALU execution"
                );
            }
            Event::Stepped { word, instruction, registers, m } => {
                let raw = format!("{:016b}", word);
                at_level!(
                    level,
                    raw = raw.as_str(),
                    parsed = ?instruction,
                    a = registers.a,
                    d = registers.d,
                    m,
                    pc = registers.pc,
                    "CPU tick completed"
                );
            }
            Event::LoadRejected { address, text, error } => {
                at_level!(
                    level,
                    address,
                    text = text.as_str(),
                    error = error.as_str(),
                    "Rejected instruction"
                );
            }
        }
    }
}
