//! Symbol table for the Hack assembler.
//!
//! Maps symbol names to addresses. The architecture symbols are present
//! from the start; unknown names referenced by A-instructions are
//! allocated RAM addresses counting up from 16.

use std::collections::HashMap;

/// First address handed out to a variable.
pub const FIRST_VARIABLE: u32 = 16;

/// The predefined architecture symbols.
pub const PREDEFINED: [(&str, u32); 23] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("SCREEN", 16384),
    ("KBD", 24576),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
];

/// Name-to-address map for one assembly session.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    table: HashMap<String, u32>,
    next_allocation: u32,
}

impl SymbolTable {
    /// Create a table holding only the predefined symbols.
    pub fn new() -> Self {
        Self {
            table: PREDEFINED
                .iter()
                .map(|&(name, addr)| (name.to_string(), addr))
                .collect(),
            next_allocation: FIRST_VARIABLE,
        }
    }

    /// Return the address of `name`, allocating the next free one if the
    /// name is unknown.
    ///
    /// Predefined symbols whose address is 0 (`SP`, `R0`) resolve to 0
    /// like any other existing entry.
    pub fn allocate_or_get(&mut self, name: &str) -> u32 {
        if let Some(&addr) = self.table.get(name) {
            return addr;
        }
        self.insert_at(name, self.next_free())
    }

    /// Like [`allocate_or_get`](Self::allocate_or_get), but refuses to
    /// allocate past `max`.
    ///
    /// On refusal the table is left untouched and the address the name
    /// would have received is returned.
    pub fn try_allocate(&mut self, name: &str, max: u32) -> Result<u32, u32> {
        if let Some(&addr) = self.table.get(name) {
            return Ok(addr);
        }
        let addr = self.next_free();
        if addr > max {
            return Err(addr);
        }
        Ok(self.insert_at(name, addr))
    }

    /// First unreserved address at or after the allocation counter.
    fn next_free(&self) -> u32 {
        let mut addr = self.next_allocation;
        while is_reserved(addr) {
            addr += 1;
        }
        addr
    }

    fn insert_at(&mut self, name: &str, addr: u32) -> u32 {
        self.table.insert(name.to_string(), addr);
        self.next_allocation = addr + 1;
        addr
    }

    /// Look up a name without allocating.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.table.get(name).copied()
    }

    /// Bind a label to a ROM address.
    ///
    /// Returns the name back if it is already bound.
    pub fn define_label(&mut self, name: &str, addr: u16) -> Result<(), String> {
        if self.table.contains_key(name) {
            return Err(name.to_string());
        }
        self.table.insert(name.to_string(), addr as u32);
        Ok(())
    }

    /// The address the next allocation would start from.
    pub fn next_allocation(&self) -> u32 {
        self.next_allocation
    }

    /// Iterate over all entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.table.iter().map(|(name, &addr)| (name.as_str(), addr))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether an address belongs to a predefined symbol.
fn is_reserved(addr: u32) -> bool {
    PREDEFINED.iter().any(|&(_, a)| a == addr)
}
