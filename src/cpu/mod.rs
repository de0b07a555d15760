//! CPU emulation for the 4-bit machine.
//!
//! This module implements the complete architecture:
//! - 16 four-bit registers (R0 receives ALU results)
//! - 16 eleven-bit program words
//! - a 4-bit program counter ("clock")
//! - 8-instruction set with two 4-bit operands

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;
pub mod loader;
pub mod run;
pub mod snapshot;

pub use memory::{Memory, MemoryError};
pub use registers::Registers;
pub use decode::{Instruction, Opcode, DecodeError};
pub use execute::{Cpu, CpuError, Mode};
pub use run::{Cadence, RunConfig};
pub use snapshot::Snapshot;
