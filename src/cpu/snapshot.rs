//! Point-in-time view of the machine for front ends.

use crate::bits::{Nibble, Word11};
use crate::cpu::decode::Instruction;
use crate::cpu::execute::Mode;
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::registers::REGISTER_COUNT;
use serde::{Serialize, Deserialize};

/// Everything a display needs, copied out between cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registers: [Nibble; REGISTER_COUNT],
    pub program: [Word11; MEMORY_SIZE],
    pub pc: Nibble,
    pub mode: Mode,
    pub cycles: u64,
    pub last_instruction: Option<Instruction>,
}

impl Snapshot {
    /// Serialize as a JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Program word at the program counter.
    pub fn current_word(&self) -> Word11 {
        self.program[self.pc.index()]
    }
}
