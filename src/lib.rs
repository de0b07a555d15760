//! # 4-bit Machine Emulator
//!
//! An instructional emulator of a minimal 4-bit processor: sixteen 4-bit
//! registers, sixteen 11-bit program words, a 4-bit clock and eight
//! opcodes. The machine is driven by typed bit strings, either executing
//! them at once, capturing them as a program, or running that program at a
//! fixed cadence.

pub mod bits;
pub mod cpu;
pub mod asm;

#[cfg(feature = "console")]
pub mod console;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use bits::{Bit, Nibble, Word11};
pub use cpu::{Cpu, CpuError, Mode, Memory, Registers, Instruction, Opcode, RunConfig, Cadence, Snapshot};
pub use asm::{assemble, disassemble, AssemblerError, load_image, save_image};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
