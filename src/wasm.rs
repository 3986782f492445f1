//! WebAssembly bindings for the Hack emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::asm::{assemble, disassemble_word};
use crate::cpu::{Cpu, Wiring};
use crate::diag::NullSink;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance. `legacy` selects the legacy ALU wiring.
    #[wasm_bindgen(constructor)]
    pub fn new(legacy: Option<bool>) -> Self {
        let wiring = if legacy.unwrap_or(false) { Wiring::Legacy } else { Wiring::Canonical };
        Self {
            cpu: Cpu::new().wiring(wiring).sink(NullSink),
        }
    }

    /// Assemble one instruction into ROM at `address`.
    #[wasm_bindgen]
    pub fn load(&mut self, text: &str, address: u16) -> Result<(), JsError> {
        self.cpu.load(text, address)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Load a program from assembly source code at ROM[0].
    /// Returns the instruction count.
    #[wasm_bindgen(js_name = loadAsm)]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let program = assemble(source)
            .map_err(|e| JsError::new(&e.to_string()))?;

        self.cpu.load_program(&program.words)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.cpu.reset();

        Ok(program.len())
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> String {
        self.cpu.step().to_string()
    }

    /// Run `count` instructions. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, count: u32) -> u64 {
        self.cpu.run(u64::from(count));
        self.cpu.cycles
    }

    /// Zero the registers and cycle counter. ROM and RAM are kept.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    #[wasm_bindgen(getter)]
    pub fn a(&self) -> u16 {
        self.cpu.a()
    }

    #[wasm_bindgen(getter)]
    pub fn d(&self) -> u16 {
        self.cpu.d()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.cpu.pc()
    }

    #[wasm_bindgen(getter)]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get RAM cell value.
    #[wasm_bindgen(js_name = ramAt)]
    pub fn ram_at(&self, address: u16) -> u16 {
        self.cpu.ram().read(address)
    }

    /// Get ROM cell value.
    #[wasm_bindgen(js_name = romAt)]
    pub fn rom_at(&self, address: u16) -> u16 {
        self.cpu.rom().read(address)
    }

    /// Set RAM cell value.
    #[wasm_bindgen(js_name = setRam)]
    pub fn set_ram(&mut self, address: u16, value: u16) {
        self.cpu.ram_mut().write(address, value);
    }

    /// Copy out `count` RAM cells starting at `start`, clamped to the end
    /// of memory.
    #[wasm_bindgen(js_name = ramSlice)]
    pub fn ram_slice(&self, start: u16, count: usize) -> js_sys::Uint16Array {
        js_sys::Uint16Array::from(self.cpu.ram().slice(start, count))
    }

    /// Get registers, RAM[A] and the cycle count as a JSON string.
    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu.snapshot())
            .map_err(|e| JsError::new(&e.to_string()))
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Assemble source code and return instruction count.
#[wasm_bindgen(js_name = assemble)]
pub fn wasm_assemble(source: &str) -> Result<usize, JsError> {
    let program = assemble(source)
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(program.len())
}

/// Disassemble a single instruction word.
#[wasm_bindgen(js_name = disassemble)]
pub fn wasm_disassemble(word: u16) -> String {
    disassemble_word(word)
}
