//! Base-32 codec over the confusion-free license alphabet
//!
//! Consumes 5 bits per character, MSB-first over the input bit stream. A
//! partial trailing chunk is left-aligned (padded with zero bits on the
//! right), so a decoder that knows the expected total bit count recovers
//! the stream exactly. There are no padding characters.

use bitvec::prelude::*;
use once_cell::sync::Lazy;

use crate::error::{LicenseError, Result};

/// The 32-symbol alphabet: digits and letters, omitting I, O, L and U
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTWVXYZ";

/// Reverse lookup: byte value -> 5-bit symbol value, or -1
static ALPHABET_INDEX: Lazy<[i8; 256]> = Lazy::new(|| {
    let mut table = [-1i8; 256];
    for (value, &symbol) in ALPHABET.iter().enumerate() {
        table[symbol as usize] = value as i8;
    }
    table
});

/// Number of characters needed to carry `total_bits` bits
pub fn encoded_len(total_bits: usize) -> usize {
    total_bits.div_ceil(5)
}

/// The 5-bit value of an alphabet character, or `None` for outsiders
pub fn alphabet_value(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    let value = ALPHABET_INDEX[c as usize];
    (value >= 0).then_some(value as u8)
}

/// Encode a bit stream into alphabet characters
pub fn encode_bits(bits: &BitSlice<u8, Msb0>) -> String {
    let mut out = String::with_capacity(encoded_len(bits.len()));
    for chunk in bits.chunks(5) {
        let mut value = 0usize;
        for bit in chunk {
            value = (value << 1) | usize::from(*bit);
        }
        // Left-align a partial trailing chunk.
        value <<= 5 - chunk.len();
        out.push(ALPHABET[value] as char);
    }
    out
}

/// Encode whole bytes (a `len * 8`-bit stream)
pub fn encode_bytes(bytes: &[u8]) -> String {
    encode_bits(bytes.view_bits::<Msb0>())
}

/// Decode alphabet characters back into a bit stream of known length
///
/// The string must carry at least `expected_total_bits` bits; trailing
/// alignment bits beyond that count are discarded.
pub fn decode_bits(encoded: &str, expected_total_bits: usize) -> Result<BitVec<u8, Msb0>> {
    let carried_bits = encoded.chars().count() * 5;
    if carried_bits < expected_total_bits {
        return Err(LicenseError::InsufficientBits {
            expected: expected_total_bits,
            got: carried_bits,
        });
    }

    let mut bits = BitVec::<u8, Msb0>::with_capacity(carried_bits);
    for ch in encoded.chars() {
        let Some(value) = alphabet_value(ch) else {
            return Err(LicenseError::InvalidCharacter(ch));
        };
        for i in (0..5).rev() {
            bits.push((value >> i) & 1 == 1);
        }
    }
    bits.truncate(expected_total_bits);
    Ok(bits)
}

/// Decode into whole bytes, MSB-aligned with zero-padded tail bits
pub fn decode_bytes(encoded: &str, expected_total_bits: usize) -> Result<Vec<u8>> {
    let mut bits = decode_bits(encoded, expected_total_bits)?;
    bits.resize(expected_total_bits.div_ceil(8) * 8, false);
    Ok(bits.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_shape() {
        assert_eq!(ALPHABET.len(), 32);
        for forbidden in [b'I', b'O', b'L', b'U'] {
            assert!(!ALPHABET.contains(&forbidden));
        }
    }

    #[test]
    fn test_byte_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        let encoded = encode_bytes(&data);
        assert_eq!(encoded.len(), encoded_len(data.len() * 8));
        let decoded = decode_bytes(&encoded, data.len() * 8).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_non_multiple_of_five_bit_count() {
        // 19 bytes = 152 bits -> 31 characters with a 3-bit tail chunk.
        let data = [0xA5u8; 19];
        let encoded = encode_bytes(&data);
        assert_eq!(encoded.len(), 31);
        assert_eq!(decode_bytes(&encoded, 152).unwrap(), data);
    }

    #[test]
    fn test_invalid_character_rejected() {
        match decode_bits("ABCI0", 25) {
            Err(LicenseError::InvalidCharacter('I')) => {}
            other => panic!("expected InvalidCharacter, got {other:?}"),
        }
        assert!(matches!(
            decode_bits("abc", 15),
            Err(LicenseError::InvalidCharacter('a'))
        ));
    }

    #[test]
    fn test_insufficient_bits_rejected() {
        assert!(matches!(
            decode_bits("00000", 26),
            Err(LicenseError::InsufficientBits { expected: 26, got: 25 })
        ));
    }

    #[test]
    fn test_trailing_chunk_left_aligned() {
        // A single 1-bit stream: the chunk value 1 is shifted to the top
        // of its 5-bit symbol, i.e. 0b10000 = 16 -> 'G'.
        let mut bits = BitVec::<u8, Msb0>::new();
        bits.push(true);
        assert_eq!(encode_bits(&bits), "G");
        let decoded = decode_bits("G", 1).unwrap();
        assert_eq!(decoded.len(), 1);
        assert!(decoded[0]);
    }
}
