//! Word codec for sensor frames.
//!
//! Every 16-bit value on the wire is followed by its checksum byte:
//!
//! ```text
//! | high | low | crc | high | low | crc | ...
//! ```
//!
//! A dual-measurement frame is two such groups (6 bytes).

use crate::crc::{calculate_crc8, checksum, checksum_table};

/// Bytes per `{high, low, checksum}` group.
pub const WORD_LEN: usize = 3;

/// Largest response the command set produces (serial ID, 3 words).
pub const MAX_FRAME_LEN: usize = 3 * WORD_LEN;

/// A decoded group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Word {
    /// Checksum matched.
    Valid(u16),
    /// Checksum did not match. The decoded value is kept for diagnostics.
    ChecksumError {
        value: u16,
        received: u8,
        computed: u8,
    },
}

impl Word {
    /// The value if the checksum matched.
    #[inline]
    #[must_use]
    pub const fn valid(self) -> Option<u16> {
        match self {
            Word::Valid(v) => Some(v),
            Word::ChecksumError { .. } => None,
        }
    }

    /// The decoded value regardless of checksum.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        match self {
            Word::Valid(v) | Word::ChecksumError { value: v, .. } => v,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Word::Valid(_))
    }
}

/// Error for malformed frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Frame or buffer length does not match the word count.
    Length { expected: usize, actual: usize },
}

/// Decode one `{high, low, checksum}` group.
#[inline]
#[must_use]
pub fn decode_word(group: [u8; WORD_LEN]) -> Word {
    let value = u16::from_be_bytes([group[0], group[1]]);
    let computed = checksum_table(value);
    if computed == group[2] {
        Word::Valid(value)
    } else {
        Word::ChecksumError {
            value,
            received: group[2],
            computed,
        }
    }
}

/// Decode a frame of exactly `N` groups.
///
/// ```
/// use sgp_proto::{decode_words, Word};
///
/// let words = decode_words::<2>(&[0xBE, 0xEF, 0x92, 0x00, 0x00, 0x00]).unwrap();
/// assert_eq!(words[0], Word::Valid(0xBEEF));
/// assert!(!words[1].is_valid());
/// ```
pub fn decode_words<const N: usize>(frame: &[u8]) -> Result<[Word; N], FrameError> {
    let expected = N * WORD_LEN;
    if frame.len() != expected {
        return Err(FrameError::Length {
            expected,
            actual: frame.len(),
        });
    }

    Ok(core::array::from_fn(|i| {
        let at = i * WORD_LEN;
        decode_word([frame[at], frame[at + 1], frame[at + 2]])
    }))
}

/// Encode one word followed by its checksum.
#[inline]
#[must_use]
pub const fn encode_word(value: u16) -> [u8; WORD_LEN] {
    let [high, low] = value.to_be_bytes();
    [high, low, checksum(value)]
}

/// Encode a sequence of words into `buf`, returning the bytes written.
pub fn encode_words(values: &[u16], buf: &mut [u8]) -> Result<usize, FrameError> {
    let needed = values.len() * WORD_LEN;
    if buf.len() < needed {
        return Err(FrameError::Length {
            expected: needed,
            actual: buf.len(),
        });
    }

    for (chunk, &value) in buf.chunks_exact_mut(WORD_LEN).zip(values) {
        let bytes = value.to_be_bytes();
        chunk[..2].copy_from_slice(&bytes);
        chunk[2] = calculate_crc8(&bytes);
    }
    Ok(needed)
}
