//! Hack memory subsystem.
//!
//! Instruction memory (ROM) and data memory (RAM) are separate, each
//! 65536 sixteen-bit cells. Since addresses are `u16`, every address is in
//! range and plain reads and writes cannot fail.
//!
//! RAM is reached through the [`DataMemory`] trait so that a CPU can run
//! against a store owned by someone else: `Rc<RefCell<Ram>>` for a
//! single-threaded front-end, `Arc<Mutex<Ram>>` when the owner reads from
//! another thread.

use crate::error::RangeError;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// The number of cells in each memory.
pub const MEMORY_SIZE: usize = 1 << 16;

/// Word-addressed data memory as seen by the CPU.
pub trait DataMemory {
    /// Read the cell at `addr`.
    fn read(&self, addr: u16) -> u16;

    /// Write `value` to the cell at `addr`.
    fn write(&mut self, addr: u16, value: u16);
}

/// A zero-initialized bank of 65536 sixteen-bit cells.
#[derive(Clone, PartialEq, Eq)]
struct Cells(Box<[u16]>);

impl Cells {
    fn new() -> Self {
        Self(vec![0; MEMORY_SIZE].into_boxed_slice())
    }

    fn non_zero(&self) -> usize {
        self.0.iter().filter(|&&cell| cell != 0).count()
    }
}

/// Data memory. Cells hold full 16-bit words.
#[derive(Clone, PartialEq, Eq)]
pub struct Ram {
    cells: Cells,
}

impl Ram {
    /// Create a new RAM with all cells zeroed.
    pub fn new() -> Self {
        Self { cells: Cells::new() }
    }

    /// Read a cell.
    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        self.cells.0[addr as usize]
    }

    /// Write a cell.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u16) {
        self.cells.0[addr as usize] = value;
    }

    /// Borrow a window of cells, clamped to the end of memory.
    pub fn slice(&self, start: u16, count: usize) -> &[u16] {
        let start = start as usize;
        let end = start.saturating_add(count).min(MEMORY_SIZE);
        &self.cells.0[start..end]
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ram")
            .field("non_zero_cells", &self.cells.non_zero())
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

impl DataMemory for Ram {
    fn read(&self, addr: u16) -> u16 {
        Ram::read(self, addr)
    }

    fn write(&mut self, addr: u16, value: u16) {
        Ram::write(self, addr, value)
    }
}

impl<M: DataMemory + ?Sized> DataMemory for Box<M> {
    fn read(&self, addr: u16) -> u16 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, value: u16) {
        (**self).write(addr, value)
    }
}

impl<M: DataMemory> DataMemory for Rc<RefCell<M>> {
    fn read(&self, addr: u16) -> u16 {
        self.borrow().read(addr)
    }

    fn write(&mut self, addr: u16, value: u16) {
        self.borrow_mut().write(addr, value)
    }
}

impl<M: DataMemory> DataMemory for Arc<Mutex<M>> {
    fn read(&self, addr: u16) -> u16 {
        // A poisoned lock still holds plain integers; keep going.
        let guard = self.lock().unwrap_or_else(|e| e.into_inner());
        guard.read(addr)
    }

    fn write(&mut self, addr: u16, value: u16) {
        let mut guard = self.lock().unwrap_or_else(|e| e.into_inner());
        guard.write(addr, value)
    }
}

/// Instruction memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Rom {
    cells: Cells,
}

impl Rom {
    /// Create a new ROM with all cells zeroed.
    pub fn new() -> Self {
        Self { cells: Cells::new() }
    }

    /// Read a word.
    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        self.cells.0[addr as usize]
    }

    /// Write a word.
    #[inline]
    pub fn write(&mut self, addr: u16, word: u16) {
        self.cells.0[addr as usize] = word;
    }

    /// Load a program starting at the given address.
    ///
    /// Nothing is written unless the whole program fits.
    pub fn load(&mut self, start: u16, program: &[u16]) -> Result<(), RangeError> {
        let start = start as usize;
        let available = MEMORY_SIZE - start;
        if program.len() > available {
            return Err(RangeError::ProgramTooLarge {
                size: program.len(),
                available,
            });
        }

        self.cells.0[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }
}

impl Default for Rom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Rom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rom")
            .field("non_zero_words", &self.cells.non_zero())
            .field("total_words", &MEMORY_SIZE)
            .finish()
    }
}
