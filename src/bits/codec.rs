//! Conversion between unsigned integers and MSB-first bit sequences.
//!
//! Values are reduced modulo `2^width` on the way in, so encoding never
//! fails. Decoding accepts any sequence.

use super::Bit;

/// Widest value the codec handles.
pub const MAX_WIDTH: u32 = u64::BITS;

/// Mask selecting the low `width` bits.
#[inline]
pub const fn mask(width: u32) -> u64 {
    if width >= MAX_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Encode `value` as `width` bits, most significant first.
///
/// Anything above `width` bits is discarded (wraparound).
pub fn to_bits(value: u64, width: u32) -> Vec<Bit> {
    let value = value & mask(width);
    (0..width)
        .rev()
        .map(|shift| {
            if shift >= MAX_WIDTH {
                Bit::Zero
            } else {
                Bit::from_lsb(value >> shift)
            }
        })
        .collect()
}

/// Decode a big-endian bit sequence.
///
/// Sequences longer than 64 bits keep their low 64 bits.
pub fn from_bits(bits: &[Bit]) -> u64 {
    bits.iter()
        .fold(0u64, |acc, bit| acc.wrapping_shl(1) | u64::from(bit.to_u8()))
}

/// Render bits as a `0`/`1` string.
pub fn bits_to_string(bits: &[Bit]) -> String {
    bits.iter().map(|b| b.to_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bits_msb_first() {
        let bits = to_bits(0b0110, 4);
        assert_eq!(bits, vec![Bit::Zero, Bit::One, Bit::One, Bit::Zero]);
    }

    #[test]
    fn test_to_bits_wraps() {
        // 17 mod 16 = 1
        assert_eq!(from_bits(&to_bits(17, 4)), 1);
        assert_eq!(bits_to_string(&to_bits(u64::MAX, 3)), "111");
    }

    #[test]
    fn test_from_bits_empty() {
        assert_eq!(from_bits(&[]), 0);
    }

    #[test]
    fn test_full_width() {
        assert_eq!(from_bits(&to_bits(u64::MAX, 64)), u64::MAX);
        assert_eq!(to_bits(0, 64).len(), 64);
    }

    #[test]
    fn test_four_bit_roundtrip() {
        for v in 0..16u64 {
            assert_eq!(from_bits(&to_bits(v, 4)), v);
        }
    }

    #[test]
    fn test_instruction_layout() {
        // IMMD R1, 5
        assert_eq!(bits_to_string(&to_bits(0b011_0001_0101, 11)), "01100010101");
    }
}
