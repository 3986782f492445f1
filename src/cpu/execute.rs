//! CPU execution engine for the Hack computer.
//!
//! Implements the fetch-decode-execute cycle. There is no halt state: the
//! caller decides how many times to call [`Cpu::step`].

use crate::alu::{self, Controls};
use crate::asm::encoder;
use crate::asm::symbols::SymbolTable;
use crate::cpu::decode::{Compute, Instruction, Jump};
use crate::cpu::memory::{DataMemory, Ram, Rom};
use crate::cpu::Registers;
use crate::diag::{DiagnosticSink, Event, TracingSink};
use crate::error::{EncodeError, RangeError};
use serde::{Serialize, Deserialize};

/// How a C-instruction drives the ALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wiring {
    /// The Hack architecture: control bits from the computation code,
    /// `y` chosen by the memory-select bit, `f` selecting ADD or AND.
    #[default]
    Canonical,

    /// Control bits `zx nx zy` from the destination mask and `ny f no` from
    /// the top of the computation code, `y` chosen by the `A` destination
    /// bit, `f` selecting AND or OR. A is written before M, so the M store
    /// and the jump target see the new A.
    Legacy,
}

impl std::fmt::Display for Wiring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Wiring::Canonical => write!(f, "canonical"),
            Wiring::Legacy => write!(f, "legacy"),
        }
    }
}

/// Register state plus the cell A points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub a: u16,
    pub d: u16,
    pub pc: u16,
    /// RAM[A]
    pub m: u16,
    pub cycles: u64,
}

/// The Hack CPU.
///
/// Owns the registers and ROM. RAM is any [`DataMemory`]: an owned [`Ram`]
/// by default, or a shared store passed to [`Cpu::with_ram`].
pub struct Cpu<M: DataMemory = Ram> {
    regs: Registers,
    rom: Rom,
    ram: M,
    wiring: Wiring,
    /// Instruction count (for profiling).
    pub cycles: u64,
    symbols: SymbolTable,
    sink: Box<dyn DiagnosticSink>,
}

impl Cpu<Ram> {
    /// Create a new CPU with zeroed state and its own RAM.
    pub fn new() -> Self {
        Self::with_ram(Ram::new())
    }
}

impl<M: DataMemory> Cpu<M> {
    /// Create a new CPU running against the given RAM.
    ///
    /// The RAM is not cleared.
    pub fn with_ram(ram: M) -> Self {
        Self {
            regs: Registers::new(),
            rom: Rom::new(),
            ram,
            wiring: Wiring::default(),
            cycles: 0,
            symbols: SymbolTable::new(),
            sink: Box::new(TracingSink),
        }
    }

    /// Use the given ALU wiring.
    pub fn wiring(mut self, wiring: Wiring) -> Self {
        self.wiring = wiring;
        self
    }

    /// Send diagnostics to `sink` instead of `tracing`.
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the diagnostic sink in place.
    pub fn set_sink(&mut self, sink: impl DiagnosticSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Reset registers and the cycle counter. ROM and RAM keep their contents.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.cycles = 0;
    }

    /// Assemble one instruction and store it at `ROM[address]`.
    ///
    /// Symbols resolve through the CPU's own table, shared by every call.
    pub fn load(&mut self, text: &str, address: u16) -> Result<(), EncodeError> {
        match encoder::encode(text, &mut self.symbols) {
            Ok(word) => {
                self.rom.write(address, word);
                Ok(())
            }
            Err(e) => {
                let event = Event::LoadRejected {
                    address,
                    text: text.to_string(),
                    error: e.to_string(),
                };
                self.sink.emit(event.level(), &event);
                Err(e)
            }
        }
    }

    /// Copy already-assembled words into ROM starting at address 0.
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), RangeError> {
        self.rom.load(0, program)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed.
    pub fn step(&mut self) -> Instruction {
        // Fetch
        let pc = self.regs.pc;
        let word = self.rom.read(pc);
        self.report(Event::Fetched { pc, word });

        // Decode
        let instr = Instruction::from(word);

        // Execute
        match instr {
            Instruction::Address { value } => {
                self.regs.a = value;
                self.regs.advance_pc();
            }
            Instruction::Compute(c) => {
                if word >> 13 != 0b111 {
                    self.report(Event::NonCanonicalWord { pc, word });
                }
                match self.wiring {
                    Wiring::Canonical => self.execute_canonical(c),
                    Wiring::Legacy => self.execute_legacy(c),
                }
            }
        }

        self.cycles += 1;
        let m = self.ram.read(self.regs.a);
        self.report(Event::Stepped {
            word,
            instruction: instr,
            registers: self.regs,
            m,
        });

        instr
    }

    /// Execute `count` instructions.
    pub fn run(&mut self, count: u64) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Check whether the step that just ran from `pc_before` parked the
    /// program: PC did not move, or an unconditional jump landed on the
    /// `@X` at address X just before it (`(END) @END 0;JMP`).
    pub fn is_parked(&self, pc_before: u16, instr: &Instruction) -> bool {
        let pc = self.regs.pc;
        if pc == pc_before {
            return true;
        }
        match instr {
            Instruction::Compute(c) if c.jump == Jump::Jmp && c.dest.is_empty() => {
                pc.wrapping_add(1) == pc_before && self.rom.read(pc) == pc
            }
            _ => false,
        }
    }

    fn execute_canonical(&mut self, c: Compute) {
        let a = self.regs.a;
        let y = if c.memory { self.ram.read(a) } else { a };
        let controls = Controls::from_bits(c.comp);
        let value = alu::compute_hack(self.regs.d, y, controls);
        self.report(Event::AluEvaluated { x: self.regs.d, y, controls, out: value });

        if c.dest.m() {
            self.ram.write(a, value);
        }
        if c.dest.a() {
            self.regs.a = value;
        }
        if c.dest.d() {
            self.regs.d = value;
        }

        if c.jump.taken(value) {
            self.regs.jump(a);
        } else {
            self.regs.advance_pc();
        }
    }

    fn execute_legacy(&mut self, c: Compute) {
        let dest = c.dest;
        let y = if dest.a() { self.ram.read(self.regs.a) } else { self.regs.a };
        let controls = Controls {
            zx: dest.a(),
            nx: dest.d(),
            zy: dest.m(),
            ny: c.comp & 0b100000 != 0,
            f: c.comp & 0b010000 != 0,
            no: c.comp & 0b001000 != 0,
        };
        let value = alu::compute(self.regs.d, y, controls);
        self.report(Event::AluEvaluated { x: self.regs.d, y, controls, out: value });

        if dest.a() {
            self.regs.a = value;
        }
        if dest.d() {
            self.regs.d = value;
        }
        if dest.m() {
            self.ram.write(self.regs.a, value);
        }

        if c.jump.taken(value) {
            self.regs.jump(self.regs.a);
        } else {
            self.regs.advance_pc();
        }
    }

    fn report(&mut self, event: Event) {
        self.sink.emit(event.level(), &event);
    }

    /// The A register.
    pub fn a(&self) -> u16 {
        self.regs.a
    }

    /// The D register.
    pub fn d(&self) -> u16 {
        self.regs.d
    }

    /// The program counter.
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    /// All registers.
    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Current register state and RAM[A].
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            a: self.regs.a,
            d: self.regs.d,
            pc: self.regs.pc,
            m: self.ram.read(self.regs.a),
            cycles: self.cycles,
        }
    }

    pub fn ram(&self) -> &M {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut M {
        &mut self.ram
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// The wiring this CPU executes with.
    pub fn current_wiring(&self) -> Wiring {
        self.wiring
    }

    /// The symbol table used by [`Cpu::load`].
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

impl Default for Cpu<Ram> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: DataMemory> std::fmt::Debug for Cpu<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("wiring", &self.wiring)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}
