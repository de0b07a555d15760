//! Program capture.
//!
//! In programming mode, submitted instructions are written to program
//! memory instead of being executed. The program counter doubles as the
//! write cursor, so capture always starts at address 0.

use crate::bits::{Nibble, Word11};
use crate::cpu::decode::Opcode;
use crate::cpu::execute::{Cpu, CpuError, Mode};
use tracing::{debug, info};

impl Cpu {
    /// Enter programming mode with the cursor at address 0.
    pub fn begin_capture(&mut self) -> Result<(), CpuError> {
        self.require_mode(Mode::Interactive)?;
        self.mode = Mode::Programming;
        self.regs.jump(Nibble::ZERO);
        info!("programming mode");
        Ok(())
    }

    /// Write one instruction at the cursor and advance it.
    ///
    /// Returns the address written. The sixteenth capture fills memory and
    /// leaves programming mode on its own.
    pub fn capture(&mut self, opcode: u8, a: u8, b: u8) -> Result<Nibble, CpuError> {
        self.require_mode(Mode::Programming)?;
        let opcode = Opcode::from_u8(opcode)?;
        let a = Nibble::checked(a).ok_or(CpuError::OperandOutOfRange { value: a })?;
        let b = Nibble::checked(b).ok_or(CpuError::OperandOutOfRange { value: b })?;

        let addr = self.regs.advance_pc();
        let word = Word11::from_fields(opcode.to_u8(), a, b);
        self.mem.write(addr, word);
        debug!(addr = addr.value(), %word, "captured");

        // The cursor wraps back to 0 only after the last word
        if self.regs.pc.is_zero() {
            self.finish_capture();
        }
        Ok(addr)
    }

    /// Leave programming mode early. Unwritten words keep their contents.
    pub fn end_capture(&mut self) -> Result<(), CpuError> {
        self.require_mode(Mode::Programming)?;
        self.finish_capture();
        Ok(())
    }

    fn finish_capture(&mut self) {
        self.regs.jump(Nibble::ZERO);
        self.mode = Mode::Interactive;
        info!("regular mode");
    }
}
