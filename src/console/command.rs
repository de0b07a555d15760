//! Console input lines.
//!
//! A line is either a command word or one binary instruction:
//! `OPCODE (3-bit) INPUT1 (4-bit) INPUT2 (4-bit)`, e.g. `011 0001 0101`.

use crate::bits::{self, ParseError};
use thiserror::Error;

/// One parsed console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Clear registers, program memory and the clock.
    Reset,
    /// Quit.
    Exit,
    /// Start capturing into program memory.
    Program,
    /// Run the program in memory.
    Run,
    /// Stop capturing early.
    End,
    /// Execute (or capture) one instruction.
    Instruction { opcode: u8, a: u8, b: u8 },
}

/// Parse one input line. Case and surrounding whitespace are ignored.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim().to_lowercase();

    match line.as_str() {
        "reset" => return Ok(Command::Reset),
        "exit" => return Ok(Command::Exit),
        "program" => return Ok(Command::Program),
        "run" => return Ok(Command::Run),
        "end" => return Ok(Command::End),
        _ => {}
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let [opcode, a, b] = parts.as_slice() else {
        return Err(CommandError::WrongFieldCount(parts.len()));
    };

    Ok(Command::Instruction {
        opcode: parse_field("OPCODE", opcode, 3)?,
        a: parse_field("INPUT1", a, 4)?,
        b: parse_field("INPUT2", b, 4)?,
    })
}

fn parse_field(field: &'static str, text: &str, width: u32) -> Result<u8, CommandError> {
    let bits = bits::parse_bits(text, width).map_err(|source| CommandError::Field { field, source })?;
    Ok(bits::from_bits(&bits) as u8)
}

/// A console line that is neither a command nor a well-formed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("expected 3 fields, got {0}")]
    WrongFieldCount(usize),

    #[error("{field}: {source}")]
    Field { field: &'static str, source: ParseError },
}
