//! Binary number primitives.
//!
//! This module provides the core types for working with the machine's words:
//! - [`Bit`] - A single binary digit
//! - [`Nibble`] - A 4-bit value (registers, program counter, operands)
//! - [`Word11`] - An 11-bit instruction word
//! - [`to_bits`] / [`from_bits`] - the MSB-first codec underneath them

mod bit;
mod word;
pub mod codec;

pub use bit::Bit;
pub use word::{Nibble, Word11, ParseError, parse_bits};
pub use codec::{to_bits, from_bits};
