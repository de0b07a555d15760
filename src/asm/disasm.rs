//! Disassembler for 4-bit programs.
//!
//! Converts instruction words back to readable assembly.

use crate::bits::Word11;
use crate::cpu::decode::{decode, Instruction};

/// Disassemble a single word to text.
pub fn disassemble_instruction(word: Word11) -> String {
    format_instruction(&decode(word))
}

/// Disassemble a slice of words, one line per address.
pub fn disassemble(words: &[Word11]) -> String {
    let mut output = String::new();
    output.push_str("; 4-bit CPU disassembly\n");
    output.push_str("; ---------------------\n\n");

    for (addr, word) in words.iter().enumerate() {
        let line = disassemble_instruction(*word);
        output.push_str(&format!("{:02}: {:<14} ; {}\n", addr, line, word.grouped()));
    }

    output
}

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    let mnemonic = instr.opcode().mnemonic();
    match *instr {
        Instruction::Add { a, b }
        | Instruction::Sub { a, b }
        | Instruction::And { a, b }
        | Instruction::Or { a, b } => format!("{} R{}, R{}", mnemonic, a.value(), b.value()),

        Instruction::Mov { src, dst } | Instruction::Not { src, dst } => {
            format!("{} R{}, R{}", mnemonic, src.value(), dst.value())
        }

        Instruction::Immd { dst, value } => format!("{} R{}, {}", mnemonic, dst.value(), value.value()),

        Instruction::JmpIfZero { target, test } => {
            format!("{} {}, R{}", mnemonic, target.value(), test.value())
        }
    }
}
