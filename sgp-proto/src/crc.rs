//! CRC-8 checksum used by Sensirion gas sensors.
//!
//! Polynomial `0x31`, initial value `0xFF`, no input or output reflection and
//! no final XOR. The same parameters are catalogued as CRC-8/NRSC-5.
//!
//! Three paths compute the same value:
//!
//! - [`checksum`] - bit-wise reference over one 16-bit word
//! - [`checksum_table`] - 16×16 nibble lookup table over one 16-bit word
//! - [`calculate_crc8`] - byte slices, via the `crc` crate

use crc::{Crc, CRC_8_NRSC_5};

const POLYNOMIAL: u8 = 0x31;
const INIT: u8 = 0xFF;

/// CRC-8/NRSC-5 calculator with 256-byte lookup table.
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// Run the 8-step shift/XOR procedure on the accumulator.
#[inline]
const fn shift_byte(mut acc: u8) -> u8 {
    let mut i = 0;
    while i < 8 {
        acc = if acc & 0x80 != 0 {
            (acc << 1) ^ POLYNOMIAL
        } else {
            acc << 1
        };
        i += 1;
    }
    acc
}

/// Lookup table indexed by `[high nibble][low nibble]` of the accumulator.
const NIBBLE_TABLE: [[u8; 16]; 16] = {
    let mut table = [[0u8; 16]; 16];
    let mut hi = 0;
    while hi < 16 {
        let mut lo = 0;
        while lo < 16 {
            table[hi][lo] = shift_byte(((hi << 4) | lo) as u8);
            lo += 1;
        }
        hi += 1;
    }
    table
};

#[inline]
const fn lookup(acc: u8) -> u8 {
    NIBBLE_TABLE[(acc >> 4) as usize][(acc & 0x0F) as usize]
}

/// Compute the checksum of a 16-bit word, most significant byte first.
///
/// This is the bit-wise reference definition. It is total over all inputs.
///
/// ```
/// assert_eq!(sgp_proto::checksum(0xBEEF), 0x92);
/// ```
#[inline]
#[must_use]
pub const fn checksum(data: u16) -> u8 {
    let [high, low] = data.to_be_bytes();
    let acc = shift_byte(INIT ^ high);
    shift_byte(acc ^ low)
}

/// Table-driven equivalent of [`checksum`].
#[inline]
#[must_use]
pub const fn checksum_table(data: u16) -> u8 {
    let [high, low] = data.to_be_bytes();
    let acc = lookup(INIT ^ high);
    lookup(acc ^ low)
}

/// Check a received checksum byte against a decoded word.
#[inline]
#[must_use]
pub const fn verify(data: u16, received: u8) -> bool {
    checksum_table(data) == received
}

/// Calculate the CRC-8 of an arbitrary byte slice.
#[inline]
#[must_use]
pub fn calculate_crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}
