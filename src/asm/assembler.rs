//! Simple assembler for 4-bit programs.
//!
//! Syntax:
//! ```text
//! ; Comment
//!         IMMD R1, 5      ; R1 := 5
//!         IMMD R2, 1
//! LOOP:   SUB R1, R2      ; R0 := R1 - R2
//!         MOV R0, R1
//!         JZ DONE, R1     ; jump when R1 = 0
//!         IMMD R3, 0
//!         JZ LOOP, R3     ; unconditional: R3 is 0
//! DONE:   DAT 0b00000000000
//! ```
//!
//! Register operands are `R<n>` (or a bare number), literals are decimal,
//! `0b` binary or `0x` hex. Only the jump target of `JZ` may be a label.

use crate::bits::{Nibble, Word11};
use crate::cpu::decode::{encode, Instruction, Opcode};
use crate::cpu::memory::MEMORY_SIZE;
use std::collections::HashMap;
use thiserror::Error;

/// Assemble source code to a list of instruction words.
pub fn assemble(source: &str) -> Result<Vec<Word11>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// How an operand field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Register,
    Literal,
    /// A literal or a label, resolved in pass 2.
    Target,
}

/// The assembler state.
struct Assembler {
    /// Symbol table (label -> address).
    symbols: HashMap<String, u8>,
    /// Pending label references: (output_index, label, source_line).
    pending: Vec<(usize, String, usize)>,
    /// Output words.
    output: Vec<Word11>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            pending: Vec::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<Word11>, AssemblerError> {
        // Pass 1: collect labels and generate code
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        if self.output.len() > MEMORY_SIZE {
            return Err(AssemblerError::ProgramTooLarge {
                size: self.output.len(),
                available: MEMORY_SIZE,
            });
        }

        // Pass 2: resolve forward references
        self.resolve_references()?;

        Ok(std::mem::take(&mut self.output))
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        // Remove comments
        let line = match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let mut line = line.trim();

        if line.is_empty() {
            return Ok(());
        }

        // Check for label definition
        if let Some(colon_idx) = line.find(':') {
            let label = line[..colon_idx].trim().to_uppercase();
            if label.is_empty() || label.contains(char::is_whitespace) {
                return Err(AssemblerError::SyntaxError {
                    line: line_num,
                    message: format!("invalid label '{}'", &line[..colon_idx]),
                });
            }
            if self.symbols.insert(label.clone(), self.output.len() as u8).is_some() {
                return Err(AssemblerError::DuplicateLabel { line: line_num, label });
            }
            line = line[colon_idx + 1..].trim();
            if line.is_empty() {
                return Ok(());
            }
        }

        self.process_instruction(line, line_num)
    }

    fn process_instruction(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, rest)) => (m.to_uppercase(), rest),
            None => (line.to_uppercase(), ""),
        };
        let operands: Vec<&str> = rest
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if matches!(mnemonic.as_str(), "DAT" | "DATA") {
            let [value] = operands.as_slice() else {
                return Err(wrong_operand_count(line_num, &mnemonic, 1, operands.len()));
            };
            let raw = parse_number(value).ok_or_else(|| AssemblerError::SyntaxError {
                line: line_num,
                message: format!("invalid number '{}'", value),
            })?;
            if raw > u32::from(Word11::MAX) {
                return Err(AssemblerError::ValueOutOfRange { line: line_num, value: raw });
            }
            self.output.push(Word11::new(raw as u16));
            return Ok(());
        }

        let (opcode, kinds) = match mnemonic.as_str() {
            "ADD" => (Opcode::Add, [Operand::Register, Operand::Register]),
            "SUB" => (Opcode::Sub, [Operand::Register, Operand::Register]),
            "AND" => (Opcode::And, [Operand::Register, Operand::Register]),
            "OR" => (Opcode::Or, [Operand::Register, Operand::Register]),
            "MOV" => (Opcode::Mov, [Operand::Register, Operand::Register]),
            "NOT" => (Opcode::Not, [Operand::Register, Operand::Register]),
            "IMMD" | "IMM" => (Opcode::Immd, [Operand::Register, Operand::Literal]),
            "JZ" | "JMP_IF_ZERO" => (Opcode::JmpIfZero, [Operand::Target, Operand::Register]),
            _ => {
                return Err(AssemblerError::UnknownMnemonic {
                    line: line_num,
                    mnemonic,
                })
            }
        };

        if operands.len() != 2 {
            return Err(wrong_operand_count(line_num, &mnemonic, 2, operands.len()));
        }

        let a = self.parse_operand(operands[0], kinds[0], line_num)?;
        let b = self.parse_operand(operands[1], kinds[1], line_num)?;
        self.output.push(encode(&Instruction::new(opcode, a, b)));
        Ok(())
    }

    fn parse_operand(&mut self, operand: &str, kind: Operand, line_num: usize) -> Result<Nibble, AssemblerError> {
        let text = match kind {
            Operand::Register => operand
                .strip_prefix('R')
                .or_else(|| operand.strip_prefix('r'))
                .unwrap_or(operand),
            Operand::Literal | Operand::Target => operand,
        };

        if let Some(value) = parse_number(text) {
            return u8::try_from(value)
                .ok()
                .and_then(Nibble::checked)
                .ok_or(AssemblerError::ValueOutOfRange { line: line_num, value });
        }

        if kind == Operand::Target {
            // Label reference, patched in pass 2
            self.pending.push((self.output.len(), operand.to_uppercase(), line_num));
            return Ok(Nibble::ZERO);
        }

        Err(AssemblerError::SyntaxError {
            line: line_num,
            message: format!("invalid operand '{}'", operand),
        })
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for (out_idx, label, line_num) in &self.pending {
            let addr = self.symbols.get(label).ok_or_else(|| AssemblerError::UndefinedLabel {
                line: *line_num,
                label: label.clone(),
            })?;

            let word = self.output[*out_idx];
            self.output[*out_idx] = Word11::from_fields(word.opcode(), Nibble::new(*addr), word.operand_b());
        }
        Ok(())
    }
}

/// Parse a decimal, `0b` binary or `0x` hex number.
fn parse_number(text: &str) -> Option<u32> {
    if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        return u32::from_str_radix(bin, 2).ok();
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    text.parse().ok()
}

fn wrong_operand_count(line: usize, mnemonic: &str, expected: usize, got: usize) -> AssemblerError {
    AssemblerError::SyntaxError {
        line,
        message: format!("{} takes {} operand(s), got {}", mnemonic, expected, got),
    }
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("label defined twice on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: u32 },

    #[error("program has {size} words but memory holds {available}")]
    ProgramTooLarge { size: usize, available: usize },
}
