//! Wire-level protocol for Sensirion SGP gas sensors.
//!
//! This crate knows nothing about buses or timers. It provides:
//!
//! - **Checksums**: the sensor's CRC-8 ([`checksum`], [`checksum_table`],
//!   [`verify`], [`calculate_crc8`])
//! - **Frames**: `{high, low, checksum}` groups ([`decode_words`],
//!   [`encode_word`], [`Word`])
//! - **Commands**: codes, settle delays and response sizes ([`Command`])
//!
//! # Frame Format
//!
//! ```text
//! | high | low | crc | high | low | crc |
//! ```
//!
//! The checksum is CRC-8 with polynomial `0x31`, initial value `0xFF`, no
//! reflection, computed over the two data bytes.
//!
//! # Example
//!
//! ```
//! use sgp_proto::{checksum, decode_words, verify, Word};
//!
//! assert!(verify(0xBEEF, checksum(0xBEEF)));
//!
//! let frame = [0x01, 0x90, 0x4C, 0x00, 0x00, 0x81];
//! let [co2eq, tvoc] = decode_words::<2>(&frame).unwrap();
//! assert_eq!(co2eq, Word::Valid(400));
//! assert_eq!(tvoc, Word::Valid(0));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod crc;
pub mod frame;

pub use self::command::{
    Command, DEFAULT_ADDRESS, MAX_COMMAND_LEN, MAX_PARAM_WORDS, SELF_TEST_FAIL, SELF_TEST_PASS,
};
pub use self::crc::{calculate_crc8, checksum, checksum_table, verify};
pub use self::frame::{
    decode_word, decode_words, encode_word, encode_words, FrameError, Word, MAX_FRAME_LEN,
    WORD_LEN,
};
