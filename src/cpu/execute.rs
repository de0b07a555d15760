//! CPU execution engine.
//!
//! Implements the fetch-decode-execute cycle, the eight instruction
//! behaviors and interactive single-cycle execution.

use crate::bits::{Nibble, Word11};
use crate::cpu::{Memory, Registers};
use crate::cpu::decode::{self, Instruction, DecodeError};
use crate::cpu::memory::MemoryError;
use crate::cpu::snapshot::Snapshot;
use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Who drives the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Instructions are typed in and executed one at a time.
    #[default]
    Interactive,
    /// Typed instructions are captured into program memory.
    Programming,
    /// Instructions are fetched from program memory on a timer.
    Running,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Interactive => write!(f, "REGULAR"),
            Mode::Programming => write!(f, "PROGRAMMING"),
            Mode::Running => write!(f, "RUNNING"),
        }
    }
}

/// The 4-bit CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Program memory.
    pub mem: Memory,
    /// Current mode.
    pub(crate) mode: Mode,
    /// Total cycles since construction or reset.
    pub cycles: u64,
    /// Last executed instruction (for display).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            mode: Mode::Interactive,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset the CPU to its initial state.
    ///
    /// Registers, program counter and program memory are zeroed together.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.mode = Mode::Interactive;
        self.cycles = 0;
        self.last_instr = None;
        info!("machine reset");
    }

    /// Load a program into memory at address 0.
    pub fn load_program(&mut self, program: &[Word11]) -> Result<(), CpuError> {
        self.mem.load_program(program)?;
        Ok(())
    }

    /// Execute one instruction submitted directly (not from program memory).
    ///
    /// The operands must fit in 4 bits; otherwise nothing changes. An opcode
    /// outside 0-7 is reported but still counts as a cycle: no register or
    /// memory changes, and the program counter advances as usual.
    pub fn submit(&mut self, opcode: u8, a: u8, b: u8) -> Result<Instruction, CpuError> {
        self.require_mode(Mode::Interactive)?;
        let a = Nibble::checked(a).ok_or(CpuError::OperandOutOfRange { value: a })?;
        let b = Nibble::checked(b).ok_or(CpuError::OperandOutOfRange { value: b })?;

        let outcome = self.dispatch(opcode, a, b);
        self.cycles += 1;
        match outcome {
            Ok((instr, jumped)) => {
                if !jumped {
                    self.regs.advance_pc();
                }
                self.last_instr = Some(instr);
                debug!(?instr, pc = self.regs.pc.value(), "submitted");
                Ok(instr)
            }
            Err(e) => {
                self.regs.advance_pc();
                warn!(opcode, "{}", e);
                Err(e.into())
            }
        }
    }

    /// Execute one cycle from program memory.
    ///
    /// Fetches the word at the program counter, executes it, and advances
    /// the program counter unless a jump was taken.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        if self.mode == Mode::Programming {
            return Err(CpuError::WrongMode {
                expected: Mode::Running,
                actual: self.mode,
            });
        }

        // Fetch
        let pc = self.regs.pc;
        let raw = self.mem.read(pc);

        // Decode
        let instr = decode::decode(raw);

        // Execute
        if !self.execute(instr) {
            self.regs.advance_pc();
        }

        self.cycles += 1;
        self.last_instr = Some(instr);
        debug!(pc = pc.value(), word = %raw, ?instr, "step");

        Ok(instr)
    }

    /// Route a raw opcode and its operands to the matching instruction.
    ///
    /// Returns the instruction and whether it jumped. An opcode outside 0-7
    /// leaves the machine untouched.
    pub fn dispatch(&mut self, opcode: u8, a: Nibble, b: Nibble) -> Result<(Instruction, bool), DecodeError> {
        let instr = Instruction::from_fields(opcode, a, b)?;
        let jumped = self.execute(instr);
        Ok((instr, jumped))
    }

    /// Execute a decoded instruction.
    ///
    /// Returns `true` if the instruction set the program counter itself, in
    /// which case the caller must skip the default increment.
    pub fn execute(&mut self, instr: Instruction) -> bool {
        let regs = &mut self.regs;
        match instr {
            // ==================== ALU ====================

            Instruction::Add { a, b } => {
                let result = regs.read(a) + regs.read(b);
                regs.write(Nibble::ZERO, result);
            }

            Instruction::Sub { a, b } => {
                let result = regs.read(a) - regs.read(b);
                regs.write(Nibble::ZERO, result);
            }

            Instruction::And { a, b } => {
                let result = regs.read(a) & regs.read(b);
                regs.write(Nibble::ZERO, result);
            }

            Instruction::Or { a, b } => {
                let result = regs.read(a) | regs.read(b);
                regs.write(Nibble::ZERO, result);
            }

            // ==================== Transfer ====================

            Instruction::Mov { src, dst } => {
                let value = regs.read(src);
                regs.write(dst, value);
            }

            Instruction::Not { src, dst } => {
                let value = !regs.read(src);
                regs.write(dst, value);
            }

            Instruction::Immd { dst, value } => {
                regs.write(dst, value);
            }

            // ==================== Control Flow ====================

            Instruction::JmpIfZero { target, test } => {
                if regs.read(test).is_zero() {
                    regs.jump(target);
                    return true;
                }
            }
        }

        false
    }

    /// Consistent view of the visible machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: *self.regs.values(),
            program: *self.mem.words(),
            pc: self.regs.pc,
            mode: self.mode,
            cycles: self.cycles,
            last_instruction: self.last_instr,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is in the timed run mode.
    pub fn is_running(&self) -> bool {
        self.mode == Mode::Running
    }

    /// Check if the CPU is capturing a program.
    pub fn is_programming(&self) -> bool {
        self.mode == Mode::Programming
    }

    pub(crate) fn require_mode(&self, expected: Mode) -> Result<(), CpuError> {
        if self.mode != expected {
            return Err(CpuError::WrongMode {
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("mode", &self.mode)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("operand {value} does not fit in 4 bits")]
    OperandOutOfRange { value: u8 },

    #[error("not available in {actual} mode (needs {expected} mode)")]
    WrongMode { expected: Mode, actual: Mode },

    #[error("run cadence must be at least 1 cycle per second")]
    ZeroCadence,

    #[error("memory error: {0}")]
    MemoryError(#[from] MemoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::encode;

    fn n(v: u8) -> Nibble {
        Nibble::new(v)
    }

    fn with_regs(values: &[(u8, u8)]) -> Cpu {
        let mut cpu = Cpu::new();
        for &(addr, value) in values {
            cpu.regs.write(n(addr), n(value));
        }
        cpu
    }

    #[test]
    fn test_add_wraps() {
        let mut cpu = with_regs(&[(1, 15), (2, 2)]);
        cpu.submit(0b000, 1, 2).unwrap();
        assert_eq!(cpu.regs.read(n(0)).value(), 1);
        assert_eq!(cpu.regs.pc.value(), 1);
    }

    #[test]
    fn test_sub_wraps() {
        let mut cpu = with_regs(&[(1, 2), (2, 5)]);
        cpu.submit(0b001, 1, 2).unwrap();
        assert_eq!(cpu.regs.read(n(0)).value(), 13);
    }

    #[test]
    fn test_mov_copies() {
        let mut cpu = with_regs(&[(1, 9), (2, 4)]);
        cpu.submit(0b010, 1, 2).unwrap();
        assert_eq!(cpu.regs.read(n(2)).value(), 9);
        assert_eq!(cpu.regs.read(n(1)).value(), 9);
    }

    #[test]
    fn test_immd_stores_literal() {
        // R3 holds 7, so dereferencing operand B would give 7 instead of 3
        let mut cpu = with_regs(&[(3, 7), (4, 12)]);
        cpu.submit(0b011, 4, 3).unwrap();
        assert_eq!(cpu.regs.read(n(4)).value(), 3);
    }

    #[test]
    fn test_jump_if_zero_taken() {
        let mut cpu = Cpu::new();
        cpu.regs.jump(n(9));
        cpu.submit(0b100, 5, 2).unwrap();
        assert_eq!(cpu.regs.pc.value(), 5);
    }

    #[test]
    fn test_jump_if_zero_not_taken() {
        let mut cpu = with_regs(&[(2, 1)]);
        cpu.regs.jump(n(9));
        cpu.submit(0b100, 5, 2).unwrap();
        assert_eq!(cpu.regs.pc.value(), 10);
    }

    #[test]
    fn test_and_or() {
        let mut cpu = with_regs(&[(14, 0b1100), (2, 0b1010)]);
        cpu.submit(0b101, 14, 2).unwrap();
        assert_eq!(cpu.regs.read(n(0)).value(), 0b1000);
        cpu.submit(0b110, 14, 2).unwrap();
        assert_eq!(cpu.regs.read(n(0)).value(), 0b1110);
    }

    #[test]
    fn test_not_masks() {
        let mut cpu = with_regs(&[(1, 0b0101)]);
        cpu.submit(0b111, 1, 2).unwrap();
        assert_eq!(cpu.regs.read(n(2)).value(), 0b1010);
        assert_eq!(cpu.regs.read(n(1)).value(), 0b0101);
    }

    #[test]
    fn test_register_fifteen_is_usable() {
        let mut cpu = Cpu::new();
        cpu.submit(0b011, 15, 6).unwrap();
        cpu.submit(0b010, 15, 1).unwrap();
        assert_eq!(cpu.regs.read(n(1)).value(), 6);
    }

    #[test]
    fn test_invalid_opcode_is_noop_but_advances() {
        let mut cpu = with_regs(&[(1, 3)]);
        let before = cpu.regs.clone();

        let err = cpu.submit(8, 1, 2).unwrap_err();
        assert_eq!(err, CpuError::DecodeError(DecodeError::InvalidOpcode(8)));
        assert_eq!(cpu.regs.values(), before.values());
        assert_eq!(cpu.regs.pc.value(), 1);
        assert_eq!(cpu.cycles, 1);
    }

    #[test]
    fn test_dispatch_invalid_opcode_leaves_state() {
        let mut cpu = with_regs(&[(1, 3)]);
        let before = cpu.snapshot();
        assert!(cpu.dispatch(9, n(0), n(1)).is_err());
        assert_eq!(cpu.snapshot(), before);
    }

    #[test]
    fn test_oversized_operand_is_rejected() {
        let mut cpu = Cpu::new();
        let before = cpu.snapshot();
        assert_eq!(
            cpu.submit(0b011, 16, 1),
            Err(CpuError::OperandOutOfRange { value: 16 })
        );
        assert_eq!(cpu.snapshot(), before);
    }

    #[test]
    fn test_step_fetches_from_memory() {
        let mut cpu = Cpu::new();
        cpu.load_program(&[
            encode(&Instruction::Immd { dst: n(1), value: n(5) }),
            encode(&Instruction::Immd { dst: n(2), value: n(3) }),
            encode(&Instruction::Add { a: n(1), b: n(2) }),
        ]).unwrap();

        for _ in 0..3 {
            cpu.step().unwrap();
        }

        assert_eq!(cpu.regs.read(n(0)).value(), 8);
        assert_eq!(cpu.regs.pc.value(), 3);
        assert_eq!(cpu.last_instruction(), Some(Instruction::Add { a: n(1), b: n(2) }));
    }

    #[test]
    fn test_step_loop_with_jump() {
        // 0: IMMD R1, 0
        // 1: JZ 3, R1
        // 2: IMMD R2, 9   (skipped)
        // 3: IMMD R3, 1
        let mut cpu = Cpu::new();
        cpu.load_program(&[
            encode(&Instruction::Immd { dst: n(1), value: n(0) }),
            encode(&Instruction::JmpIfZero { target: n(3), test: n(1) }),
            encode(&Instruction::Immd { dst: n(2), value: n(9) }),
            encode(&Instruction::Immd { dst: n(3), value: n(1) }),
        ]).unwrap();

        for _ in 0..3 {
            cpu.step().unwrap();
        }

        assert_eq!(cpu.regs.read(n(2)).value(), 0);
        assert_eq!(cpu.regs.read(n(3)).value(), 1);
        assert_eq!(cpu.regs.pc.value(), 4);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut cpu = with_regs(&[(5, 5)]);
        cpu.mem.write(n(3), Word11::new(0x123));
        cpu.regs.jump(n(8));

        cpu.reset();
        let once = cpu.snapshot();
        cpu.reset();

        assert_eq!(cpu.snapshot(), once);
        assert_eq!(once, Cpu::new().snapshot());
        assert!(once.registers.iter().all(|r| r.is_zero()));
        assert!(once.program.iter().all(|w| w.is_zero()));
        assert!(once.pc.is_zero());
    }

    #[test]
    fn test_reset_clears_cycle_count() {
        let mut cpu = Cpu::new();
        cpu.submit(0b011, 1, 5).unwrap();
        cpu.submit(0b011, 2, 3).unwrap();
        assert_eq!(cpu.cycles, 2);

        cpu.reset();
        assert_eq!(cpu.cycles, 0);
        assert_eq!(cpu.last_instruction(), None);
    }

    #[test]
    fn test_deserialized_state_stays_in_range() {
        let mut cpu = Cpu::new();
        cpu.submit(0b011, 1, 5).unwrap();
        let mut value = serde_json::to_value(&cpu).unwrap();

        let restored: Cpu = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(restored.snapshot(), cpu.snapshot());

        value["regs"]["pc"] = serde_json::json!(20);
        assert!(serde_json::from_value::<Cpu>(value.clone()).is_err());

        value["regs"]["pc"] = serde_json::json!(0);
        value["mem"]["words"][0] = serde_json::json!(4096);
        assert!(serde_json::from_value::<Cpu>(value).is_err());
    }
}
