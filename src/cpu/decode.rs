//! Instruction decoder.
//!
//! Every instruction is one 11-bit word: a 3-bit opcode followed by two
//! 4-bit operands. Since the opcode field is exactly 3 bits, decoding a
//! word is total; only raw numeric opcodes supplied from outside can be
//! invalid.

use crate::bits::{Nibble, Word11};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The eight opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    Add = 0,
    Sub = 1,
    Mov = 2,
    Immd = 3,
    JmpIfZero = 4,
    And = 5,
    Or = 6,
    Not = 7,
}

impl Opcode {
    /// All opcodes in numeric order.
    pub const ALL: [Opcode; 8] = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mov,
        Opcode::Immd,
        Opcode::JmpIfZero,
        Opcode::And,
        Opcode::Or,
        Opcode::Not,
    ];

    /// Look up an opcode by number.
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(DecodeError::InvalidOpcode(value))
    }

    /// Numeric value (0-7).
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mov => "MOV",
            Opcode::Immd => "IMMD",
            Opcode::JmpIfZero => "JZ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
        }
    }
}

/// Decoded instruction.
///
/// Operand names follow what the field means for that opcode: most take two
/// register addresses, `Immd` takes a literal value and `JmpIfZero` a literal
/// jump target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    // ==================== ALU (result in R0) ====================

    /// R0 := (a + b) mod 16
    Add { a: Nibble, b: Nibble },

    /// R0 := (a - b) mod 16
    Sub { a: Nibble, b: Nibble },

    /// R0 := a AND b
    And { a: Nibble, b: Nibble },

    /// R0 := a OR b
    Or { a: Nibble, b: Nibble },

    // ==================== Transfer ====================

    /// dst := src
    Mov { src: Nibble, dst: Nibble },

    /// dst := NOT src (4 bits)
    Not { src: Nibble, dst: Nibble },

    /// dst := literal value
    Immd { dst: Nibble, value: Nibble },

    // ==================== Control Flow ====================

    /// if test = 0 then CLK := target
    JmpIfZero { target: Nibble, test: Nibble },
}

impl Instruction {
    /// Build an instruction from raw fields.
    pub fn from_fields(opcode: u8, a: Nibble, b: Nibble) -> Result<Self, DecodeError> {
        Ok(Self::new(Opcode::from_u8(opcode)?, a, b))
    }

    /// Build an instruction from a known opcode and its two operand fields.
    pub fn new(opcode: Opcode, a: Nibble, b: Nibble) -> Self {
        match opcode {
            Opcode::Add => Instruction::Add { a, b },
            Opcode::Sub => Instruction::Sub { a, b },
            Opcode::Mov => Instruction::Mov { src: a, dst: b },
            Opcode::Immd => Instruction::Immd { dst: a, value: b },
            Opcode::JmpIfZero => Instruction::JmpIfZero { target: a, test: b },
            Opcode::And => Instruction::And { a, b },
            Opcode::Or => Instruction::Or { a, b },
            Opcode::Not => Instruction::Not { src: a, dst: b },
        }
    }

    /// The opcode of this instruction.
    pub fn opcode(&self) -> Opcode {
        self.fields().0
    }

    /// Split back into (opcode, operand A, operand B).
    pub fn fields(&self) -> (Opcode, Nibble, Nibble) {
        match *self {
            Instruction::Add { a, b } => (Opcode::Add, a, b),
            Instruction::Sub { a, b } => (Opcode::Sub, a, b),
            Instruction::Mov { src, dst } => (Opcode::Mov, src, dst),
            Instruction::Immd { dst, value } => (Opcode::Immd, dst, value),
            Instruction::JmpIfZero { target, test } => (Opcode::JmpIfZero, target, test),
            Instruction::And { a, b } => (Opcode::And, a, b),
            Instruction::Or { a, b } => (Opcode::Or, a, b),
            Instruction::Not { src, dst } => (Opcode::Not, src, dst),
        }
    }
}

/// Decode an 11-bit instruction word.
///
/// - Bits 10-8: opcode
/// - Bits 7-4: operand A
/// - Bits 3-0: operand B
pub fn decode(word: Word11) -> Instruction {
    let opcode = Opcode::ALL[usize::from(word.opcode())];
    Instruction::new(opcode, word.operand_a(), word.operand_b())
}

/// Encode an instruction back to an 11-bit word.
pub fn encode(instr: &Instruction) -> Word11 {
    let (opcode, a, b) = instr.fields();
    Word11::from_fields(opcode.to_u8(), a, b)
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid opcode: {0}")]
    InvalidOpcode(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u8) -> Nibble {
        Nibble::new(v)
    }

    #[test]
    fn test_decode_zero_word_is_add() {
        assert_eq!(decode(Word11::ZERO), Instruction::Add { a: n(0), b: n(0) });
    }

    #[test]
    fn test_decode_field_layout() {
        // 011 0100 0011 = IMMD R4, 3
        let instr = decode(Word11::new(0b011_0100_0011));
        assert_eq!(instr, Instruction::Immd { dst: n(4), value: n(3) });

        // 100 0101 0010 = JZ 5, R2
        let instr = decode(Word11::new(0b100_0101_0010));
        assert_eq!(instr, Instruction::JmpIfZero { target: n(5), test: n(2) });
    }

    #[test]
    fn test_every_word_roundtrips() {
        for raw in 0..=Word11::MAX {
            let word = Word11::new(raw);
            assert_eq!(encode(&decode(word)), word);
        }
    }

    #[test]
    fn test_from_fields_rejects_invalid_opcode() {
        assert_eq!(
            Instruction::from_fields(8, n(0), n(0)),
            Err(DecodeError::InvalidOpcode(8))
        );
        assert_eq!(
            Instruction::from_fields(7, n(1), n(2)),
            Ok(Instruction::Not { src: n(1), dst: n(2) })
        );
    }

    #[test]
    fn test_opcode_numbering() {
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(usize::from(op.to_u8()), i);
            assert_eq!(Opcode::from_u8(i as u8), Ok(*op));
        }
    }
}
