//! Register file and program counter.
//!
//! The machine has:
//! - R0-R15: 4-bit general purpose registers (R0 receives ALU results)
//! - CLK: 4-bit program counter addressing program memory

use crate::bits::Nibble;
use serde::{Serialize, Deserialize};

/// Number of general purpose registers, one per 4-bit address.
pub const REGISTER_COUNT: usize = 16;

/// The register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// General purpose registers, indexed by operand value.
    r: [Nibble; REGISTER_COUNT],

    /// CLK: program counter
    pub pc: Nibble,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            r: [Nibble::ZERO; REGISTER_COUNT],
            pc: Nibble::ZERO,
        }
    }

    /// Reset all registers and the program counter to zero.
    pub fn reset(&mut self) {
        self.r = [Nibble::ZERO; REGISTER_COUNT];
        self.pc = Nibble::ZERO;
    }

    /// Read a register. Every 4-bit address is valid.
    #[inline]
    pub fn read(&self, addr: Nibble) -> Nibble {
        self.r[addr.index()]
    }

    /// Write a register.
    #[inline]
    pub fn write(&mut self, addr: Nibble, value: Nibble) {
        self.r[addr.index()] = value;
    }

    /// All register values, R0 first.
    pub fn values(&self) -> &[Nibble; REGISTER_COUNT] {
        &self.r
    }

    /// Increment the program counter by 1 (4-bit, carry discarded).
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> Nibble {
        let old = self.pc;
        self.pc = self.pc + Nibble::new(1);
        old
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: Nibble) {
        self.pc = addr;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
