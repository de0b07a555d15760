//! Single binary digit.

use std::fmt;
use serde::{Serialize, Deserialize};

/// One binary digit.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    /// Cleared (0)
    #[default]
    Zero = 0,
    /// Set (1)
    One = 1,
}

impl Bit {
    /// Both bit values in order: 0, 1
    pub const ALL: [Bit; 2] = [Bit::Zero, Bit::One];

    /// Take the lowest bit of a value.
    #[inline]
    pub const fn from_lsb(value: u64) -> Self {
        if value & 1 == 1 { Bit::One } else { Bit::Zero }
    }

    /// Numeric value of the bit.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a `'0'` or `'1'` character.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            _ => None,
        }
    }

    /// Text form of the bit.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }

    /// Invert the bit.
    #[inline]
    pub const fn not(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }
}

impl fmt::Debug for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl std::ops::Not for Bit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Bit::not(self)
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit.to_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_involution() {
        for b in Bit::ALL {
            assert_eq!(!!b, b, "not(not({:?})) should equal {:?}", b, b);
        }
    }

    #[test]
    fn test_char_roundtrip() {
        for b in Bit::ALL {
            assert_eq!(Bit::from_char(b.to_char()), Some(b));
        }
        assert_eq!(Bit::from_char('2'), None);
        assert_eq!(Bit::from_char('x'), None);
    }

    #[test]
    fn test_from_lsb() {
        assert_eq!(Bit::from_lsb(0b10), Bit::Zero);
        assert_eq!(Bit::from_lsb(0b11), Bit::One);
    }
}
