//! The Hack arithmetic/logic unit.
//!
//! A pure combinational function of two 16-bit operands and six control
//! bits. Two function units are provided:
//! - [`compute`]: the function bit selects AND (f=1) or OR (f=0)
//! - [`compute_hack`]: the function bit selects ADD (f=1) or AND (f=0),
//!   as in the canonical Hack chip
//!
//! All arithmetic is done on `u16`, so bitwise negation never leaks past
//! 16 bits.

use crate::error::RangeError;
use serde::{Serialize, Deserialize};

/// The six ALU control bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    /// Zero the x input.
    pub zx: bool,
    /// Bitwise-negate the x input.
    pub nx: bool,
    /// Zero the y input.
    pub zy: bool,
    /// Bitwise-negate the y input.
    pub ny: bool,
    /// Function select.
    pub f: bool,
    /// Bitwise-negate the output.
    pub no: bool,
}

impl Controls {
    /// Build from six bits laid out `zx nx zy ny f no`, most significant first.
    ///
    /// This is the layout of the 6-bit computation code.
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            zx: bits & 0b100000 != 0,
            nx: bits & 0b010000 != 0,
            zy: bits & 0b001000 != 0,
            ny: bits & 0b000100 != 0,
            f: bits & 0b000010 != 0,
            no: bits & 0b000001 != 0,
        }
    }

    /// Pack back into the `zx nx zy ny f no` layout.
    pub const fn to_bits(self) -> u8 {
        (self.zx as u8) << 5
            | (self.nx as u8) << 4
            | (self.zy as u8) << 3
            | (self.ny as u8) << 2
            | (self.f as u8) << 1
            | self.no as u8
    }
}

/// Apply the zero/negate stages to one input.
#[inline]
fn preset(v: u16, zero: bool, negate: bool) -> u16 {
    let v = if zero { 0 } else { v };
    if negate { !v } else { v }
}

/// Evaluate the AND/OR unit.
///
/// ```
/// use hack::alu::{compute, Controls};
/// let and = Controls { f: true, ..Controls::default() };
/// assert_eq!(compute(5, 3, and), 1);
/// ```
pub fn compute(x: u16, y: u16, c: Controls) -> u16 {
    let x = preset(x, c.zx, c.nx);
    let y = preset(y, c.zy, c.ny);
    let out = if c.f { x & y } else { x | y };
    if c.no { !out } else { out }
}

/// Range-checked [`compute`] for callers holding wider integers.
pub fn try_compute(x: u32, y: u32, c: Controls) -> Result<u16, RangeError> {
    match (u16::try_from(x), u16::try_from(y)) {
        (Ok(x), Ok(y)) => Ok(compute(x, y, c)),
        _ => Err(RangeError::AluInput { x, y }),
    }
}

/// Evaluate the canonical Hack unit, where `f` selects a 16-bit add.
pub fn compute_hack(x: u16, y: u16, c: Controls) -> u16 {
    let x = preset(x, c.zx, c.nx);
    let y = preset(y, c.zy, c.ny);
    let out = if c.f { x.wrapping_add(y) } else { x & y };
    if c.no { !out } else { out }
}
