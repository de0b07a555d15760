//! WebAssembly bindings for the 4-bit machine.
//!
//! A browser front end drives the machine one call at a time; pacing a run
//! is left to the page's own timer calling `step`.

use wasm_bindgen::prelude::*;
use crate::bits::{Nibble, Word11};
use crate::cpu::Cpu;
use crate::asm::assembler::assemble;
use crate::asm::disasm::{disassemble_instruction, format_instruction};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// WebAssembly-friendly machine wrapper.
#[wasm_bindgen]
pub struct WasmMachine {
    cpu: Cpu,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create a machine in its reset state.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { cpu: Cpu::new() }
    }

    /// Clear registers, program memory, clock and cycle count.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Execute one instruction immediately. Returns its disassembly.
    #[wasm_bindgen]
    pub fn submit(&mut self, opcode: u8, a: u8, b: u8) -> Result<String, JsError> {
        let instr = self.cpu.submit(opcode, a, b).map_err(js_err)?;
        Ok(format_instruction(&instr))
    }

    /// Enter programming mode.
    #[wasm_bindgen]
    pub fn begin_program(&mut self) -> Result<(), JsError> {
        self.cpu.begin_capture().map_err(js_err)
    }

    /// Store one instruction at the clock address. Returns that address.
    #[wasm_bindgen]
    pub fn capture(&mut self, opcode: u8, a: u8, b: u8) -> Result<u8, JsError> {
        let addr = self.cpu.capture(opcode, a, b).map_err(js_err)?;
        Ok(addr.value())
    }

    /// Leave programming mode.
    #[wasm_bindgen]
    pub fn end_program(&mut self) -> Result<(), JsError> {
        self.cpu.end_capture().map_err(js_err)
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let words = assemble(source).map_err(js_err)?;
        self.cpu.load_program(&words).map_err(js_err)?;
        Ok(words.len())
    }

    /// Enter running mode from address 0.
    #[wasm_bindgen]
    pub fn start_run(&mut self) -> Result<(), JsError> {
        self.cpu.start_run().map_err(js_err)
    }

    /// Execute the instruction at the clock. Returns its disassembly.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let instr = self.cpu.step().map_err(js_err)?;
        Ok(format_instruction(&instr))
    }

    /// Leave running mode.
    #[wasm_bindgen]
    pub fn stop_run(&mut self) {
        self.cpu.stop_run();
    }

    /// Check if the machine is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get the clock (program counter).
    #[wasm_bindgen]
    pub fn pc(&self) -> u8 {
        self.cpu.regs.pc.value()
    }

    /// Get mode as string.
    #[wasm_bindgen]
    pub fn mode(&self) -> String {
        self.cpu.mode().to_string()
    }

    /// Get register value (0-15). Out of range addresses read as 0.
    #[wasm_bindgen]
    pub fn register(&self, index: u8) -> u8 {
        Nibble::checked(index)
            .map(|addr| self.cpu.regs.read(addr).value())
            .unwrap_or(0)
    }

    /// Get all register values.
    #[wasm_bindgen]
    pub fn registers(&self) -> Vec<u8> {
        self.cpu.regs.values().iter().map(|r| r.value()).collect()
    }

    /// Get program word (0-15) as a grouped bit string.
    #[wasm_bindgen]
    pub fn program_word(&self, index: u8) -> String {
        let word = Nibble::checked(index)
            .map(|addr| self.cpu.mem.read(addr))
            .unwrap_or(Word11::ZERO);
        word.grouped()
    }

    /// Get the full machine state as JSON.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        self.cpu.snapshot().to_json().map_err(js_err)
    }
}

impl Default for WasmMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the instruction count.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<usize, JsError> {
    let words = assemble(source).map_err(js_err)?;
    Ok(words.len())
}

/// Disassemble a single 11-bit word.
#[wasm_bindgen]
pub fn wasm_disassemble(value: u16) -> String {
    disassemble_instruction(Word11::new(value))
}
