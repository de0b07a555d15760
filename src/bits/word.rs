//! Fixed-width unsigned machine words.
//!
//! This module provides the two word sizes used by the processor:
//! - `Nibble`: 4-bit value for registers, the program counter and operands
//! - `Word11`: 11-bit instruction word (3-bit opcode, two 4-bit operands)

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use super::Bit;
use super::codec::{self, mask};

/// A 4-bit unsigned value (0-15).
///
/// Every constructor and operation wraps modulo 16, so a `Nibble` can never
/// hold more than 4 bits.
///
/// Deserializing rejects numbers above 15 rather than masking them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Nibble(u8);

/// An 11-bit instruction word.
///
/// Layout, most significant bit first:
/// - bits 10..8: opcode
/// - bits 7..4: operand A
/// - bits 3..0: operand B
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Word11(u16);

// ============================================================================
// Nibble Implementation
// ============================================================================

impl Nibble {
    /// Number of bits in a Nibble.
    pub const WIDTH: u32 = 4;

    /// Largest value: 15 (1111)
    pub const MAX: u8 = 15;

    /// Zero.
    pub const ZERO: Nibble = Nibble(0);

    /// Create from any byte, keeping the low 4 bits.
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value & Self::MAX)
    }

    /// Create from a byte only if it already fits in 4 bits.
    #[inline]
    pub const fn checked(value: u8) -> Option<Self> {
        if value <= Self::MAX { Some(Self(value)) } else { None }
    }

    /// The value as a byte.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The value as an array index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// 4-bit addition, carry discarded.
    #[inline]
    pub const fn wrapping_add(self, other: Self) -> Self {
        Self::new(self.0.wrapping_add(other.0))
    }

    /// 4-bit subtraction, borrow discarded.
    #[inline]
    pub const fn wrapping_sub(self, other: Self) -> Self {
        Self::new(self.0.wrapping_sub(other.0))
    }

    /// Bits, most significant first.
    pub fn to_bits(self) -> Vec<Bit> {
        codec::to_bits(u64::from(self.0), Self::WIDTH)
    }

    /// Build from bits, most significant first. Extra high bits are dropped.
    pub fn from_bits(bits: &[Bit]) -> Self {
        Self::new((codec::from_bits(bits) & mask(Self::WIDTH)) as u8)
    }

    /// Iterate over all 16 values in order.
    pub fn all() -> impl Iterator<Item = Nibble> {
        (0..=Self::MAX).map(Nibble)
    }
}

impl fmt::Debug for Nibble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nibble({:04b} = {})", self.0, self.0)
    }
}

impl fmt::Display for Nibble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", codec::bits_to_string(&self.to_bits()))
    }
}

impl FromStr for Nibble {
    type Err = ParseError;

    /// Parse exactly four `0`/`1` characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = parse_bits(s, Self::WIDTH)?;
        Ok(Self::from_bits(&bits))
    }
}

impl TryFrom<u8> for Nibble {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::checked(value).ok_or(ParseError::OutOfRange {
            value: u16::from(value),
            max: u16::from(Self::MAX),
        })
    }
}

impl From<Nibble> for u8 {
    fn from(n: Nibble) -> Self {
        n.0
    }
}

impl std::ops::Add for Nibble {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.wrapping_add(rhs)
    }
}

impl std::ops::Sub for Nibble {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.wrapping_sub(rhs)
    }
}

impl std::ops::BitAnd for Nibble {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl std::ops::BitOr for Nibble {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::Not for Nibble {
    type Output = Self;

    /// Bitwise NOT, masked back to 4 bits.
    fn not(self) -> Self::Output {
        Self::new(!self.0)
    }
}

// ============================================================================
// Word11 Implementation
// ============================================================================

impl Word11 {
    /// Number of bits in an instruction word.
    pub const WIDTH: u32 = 11;

    /// Width of the opcode field.
    pub const OPCODE_WIDTH: u32 = 3;

    /// Largest value: 0x7FF
    pub const MAX: u16 = 0x7FF;

    pub const ZERO: Word11 = Word11(0);

    /// Create from any u16, keeping the low 11 bits.
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value & Self::MAX)
    }

    /// Assemble a word from its three fields. The opcode keeps its low 3 bits.
    #[inline]
    pub const fn from_fields(opcode: u8, a: Nibble, b: Nibble) -> Self {
        Self(((opcode as u16 & 0b111) << 8) | ((a.value() as u16) << 4) | b.value() as u16)
    }

    /// The raw value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Bits 10..8.
    #[inline]
    pub const fn opcode(self) -> u8 {
        (self.0 >> 8) as u8 & 0b111
    }

    /// Bits 7..4.
    #[inline]
    pub const fn operand_a(self) -> Nibble {
        Nibble::new((self.0 >> 4) as u8)
    }

    /// Bits 3..0.
    #[inline]
    pub const fn operand_b(self) -> Nibble {
        Nibble::new(self.0 as u8)
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Bits, most significant first.
    pub fn to_bits(self) -> Vec<Bit> {
        codec::to_bits(u64::from(self.0), Self::WIDTH)
    }

    /// Build from bits, most significant first. Extra high bits are dropped.
    pub fn from_bits(bits: &[Bit]) -> Self {
        Self::new((codec::from_bits(bits) & mask(Self::WIDTH)) as u16)
    }

    /// Text form split into fields, e.g. `011 0001 0101`.
    pub fn grouped(self) -> String {
        let bits = codec::bits_to_string(&self.to_bits());
        format!("{} {} {}", &bits[..3], &bits[3..7], &bits[7..])
    }

    /// Parse either the packed (`01100010101`) or grouped (`011 0001 0101`) form.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let packed: String = s.split_whitespace().collect();
        packed.parse()
    }
}

impl fmt::Debug for Word11 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word11({})", self.grouped())
    }
}

impl fmt::Display for Word11 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", codec::bits_to_string(&self.to_bits()))
    }
}

impl FromStr for Word11 {
    type Err = ParseError;

    /// Parse exactly eleven `0`/`1` characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = parse_bits(s, Self::WIDTH)?;
        Ok(Self::from_bits(&bits))
    }
}

impl TryFrom<u16> for Word11 {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value > Self::MAX {
            return Err(ParseError::OutOfRange { value, max: Self::MAX });
        }
        Ok(Self(value))
    }
}

impl From<Word11> for u16 {
    fn from(w: Word11) -> Self {
        w.0
    }
}

/// Parse a field of exactly `width` binary digits.
pub fn parse_bits(s: &str, width: u32) -> Result<Vec<Bit>, ParseError> {
    let count = s.chars().count();
    if count != width as usize {
        return Err(ParseError::WrongLength { expected: width as usize, got: count });
    }
    s.chars()
        .map(|c| Bit::from_char(c).ok_or(ParseError::InvalidChar(c)))
        .collect()
}

/// Errors that can occur when parsing binary strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} bits, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("invalid bit character: '{0}' (expected 0 or 1)")]
    InvalidChar(char),

    #[error("value {value} out of range (max {max})")]
    OutOfRange { value: u16, max: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_wraps_on_construction() {
        assert_eq!(Nibble::new(17).value(), 1);
        assert_eq!(Nibble::new(0xFF).value(), 15);
        assert_eq!(Nibble::checked(16), None);
        assert_eq!(Nibble::checked(15), Some(Nibble::new(15)));
    }

    #[test]
    fn test_nibble_arithmetic_wraps() {
        assert_eq!((Nibble::new(15) + Nibble::new(2)).value(), 1);
        assert_eq!((Nibble::new(2) - Nibble::new(5)).value(), 13);
    }

    #[test]
    fn test_nibble_not_is_masked() {
        assert_eq!((!Nibble::new(0b0101)).value(), 0b1010);
        assert_eq!((!Nibble::ZERO).value(), 15);
    }

    #[test]
    fn test_nibble_display_and_parse() {
        let n = Nibble::new(5);
        assert_eq!(n.to_string(), "0101");
        assert_eq!("0101".parse::<Nibble>().unwrap(), n);
        assert_eq!(
            "101".parse::<Nibble>(),
            Err(ParseError::WrongLength { expected: 4, got: 3 })
        );
        assert_eq!("01a1".parse::<Nibble>(), Err(ParseError::InvalidChar('a')));
    }

    #[test]
    fn test_word11_fields() {
        let w = Word11::from_fields(0b011, Nibble::new(1), Nibble::new(5));
        assert_eq!(w.value(), 0b011_0001_0101);
        assert_eq!(w.opcode(), 3);
        assert_eq!(w.operand_a().value(), 1);
        assert_eq!(w.operand_b().value(), 5);
    }

    #[test]
    fn test_word11_text_forms() {
        let w = Word11::new(0b011_0001_0101);
        assert_eq!(w.to_string(), "01100010101");
        assert_eq!(w.grouped(), "011 0001 0101");
        assert_eq!(Word11::parse("011 0001 0101").unwrap(), w);
        assert_eq!(Word11::parse("01100010101").unwrap(), w);
        assert!(Word11::parse("011 0001 010").is_err());
    }

    #[test]
    fn test_deserialize_rejects_wide_values() {
        assert_eq!(serde_json::from_str::<Nibble>("15").unwrap(), Nibble::new(15));
        assert!(serde_json::from_str::<Nibble>("16").is_err());
        assert!(serde_json::from_str::<Nibble>("200").is_err());

        assert_eq!(serde_json::from_str::<Word11>("2047").unwrap(), Word11::new(0x7FF));
        assert!(serde_json::from_str::<Word11>("2048").is_err());
    }

    #[test]
    fn test_serialize_as_plain_number() {
        assert_eq!(serde_json::to_string(&Nibble::new(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Word11::new(0b011_0001_0101)).unwrap(), "789");
        assert_eq!(Nibble::try_from(9u8), Ok(Nibble::new(9)));
        assert_eq!(
            Nibble::try_from(16u8),
            Err(ParseError::OutOfRange { value: 16, max: 15 })
        );
    }

    #[test]
    fn test_word11_masks_high_bits() {
        assert_eq!(Word11::new(0xFFFF).value(), 0x7FF);
        assert_eq!(Word11::from_fields(0xFF, Nibble::ZERO, Nibble::ZERO).opcode(), 7);
    }
}
