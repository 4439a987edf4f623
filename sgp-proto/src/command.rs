//! Sensor command set.
//!
//! Each command is a fixed 2-byte code, optionally followed by checksummed
//! parameter words. After writing it the host waits the settle delay and then
//! reads `response_words` groups back.

use crate::frame::{encode_words, FrameError, WORD_LEN};

/// Default 7-bit bus address of the sensor.
pub const DEFAULT_ADDRESS: u8 = 0x59;

/// Largest parameter list any command takes.
pub const MAX_PARAM_WORDS: usize = 2;

/// Code plus the largest parameter list.
pub const MAX_COMMAND_LEN: usize = 2 + MAX_PARAM_WORDS * WORD_LEN;

/// Self-test result word when all checks passed.
pub const SELF_TEST_PASS: u16 = 0xD400;

/// Self-test result word when one or more checks failed.
pub const SELF_TEST_FAIL: u16 = 0x4B00;

/// A sensor command and its timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    /// Command code, sent most significant byte first.
    pub code: [u8; 2],
    /// Wait between the write and the read, in milliseconds.
    pub settle_ms: u32,
    /// Number of `{high, low, checksum}` groups in the response.
    pub response_words: usize,
}

impl Command {
    #[must_use]
    pub const fn new(code: [u8; 2], settle_ms: u32, response_words: usize) -> Self {
        Self {
            code,
            settle_ms,
            response_words,
        }
    }

    /// Expected response length in bytes.
    #[inline]
    #[must_use]
    pub const fn response_len(&self) -> usize {
        self.response_words * WORD_LEN
    }

    /// Same code and response, different settle delay.
    #[must_use]
    pub const fn with_settle_ms(self, settle_ms: u32) -> Self {
        Self { settle_ms, ..self }
    }

    /// Write the code and the checksummed `params` into `buf`.
    ///
    /// Returns the number of bytes to send.
    pub fn encode(&self, params: &[u16], buf: &mut [u8]) -> Result<usize, FrameError> {
        if buf.len() < 2 {
            return Err(FrameError::Length {
                expected: 2,
                actual: buf.len(),
            });
        }
        buf[..2].copy_from_slice(&self.code);
        let len = encode_words(params, &mut buf[2..]).map_err(
            |FrameError::Length { expected, actual }| FrameError::Length {
                expected: expected + 2,
                actual: actual + 2,
            },
        )?;
        Ok(2 + len)
    }
}

/// Start the on-chip air-quality algorithm.
pub const IAQ_INIT: Command = Command::new([0x20, 0x03], 10, 0);

/// Measure CO2-equivalent and TVOC.
pub const MEASURE_IAQ: Command = Command::new([0x20, 0x08], 12, 2);

/// Measure the raw signals (H2, ethanol).
pub const MEASURE_RAW: Command = Command::new([0x26, 0x0F], 25, 2);

/// Read the CO2eq and TVOC baselines.
pub const GET_IAQ_BASELINE: Command = Command::new([0x20, 0x15], 10, 2);

/// Restore the baselines. Takes two parameter words: TVOC, then CO2eq.
pub const SET_IAQ_BASELINE: Command = Command::new([0x20, 0x1E], 10, 0);

/// Read the TVOC baseline estimate used before a stored baseline exists.
pub const GET_TVOC_INCEPTIVE_BASELINE: Command = Command::new([0x20, 0xB3], 10, 1);

/// Built-in self test of the hotplate and MOX material.
pub const EXECUTE_SELF_TEST: Command = Command::new([0x28, 0x0E], 320, 1);

/// Switch the hotplate off and enter idle mode.
pub const TURN_HEATER_OFF: Command = Command::new([0x36, 0x15], 1, 0);

/// Read the 48-bit serial number.
pub const GET_SERIAL_ID: Command = Command::new([0x36, 0x82], 1, 3);

/// Soft reset.
pub const SOFT_RESET: Command = Command::new([0x00, 0x06], 10, 0);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::checksum;

    #[test]
    fn test_response_len() {
        assert_eq!(MEASURE_IAQ.response_len(), 6);
        assert_eq!(MEASURE_RAW.response_len(), 6);
        assert_eq!(GET_SERIAL_ID.response_len(), 9);
        assert_eq!(IAQ_INIT.response_len(), 0);
    }

    #[test]
    fn test_encode_plain_command() {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        let len = MEASURE_RAW.encode(&[], &mut buf).unwrap();
        assert_eq!(&buf[..len], &[0x26, 0x0F]);
    }

    #[test]
    fn test_encode_baseline_command() {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        let len = SET_IAQ_BASELINE.encode(&[0x8C41, 0x1234], &mut buf).unwrap();
        assert_eq!(len, MAX_COMMAND_LEN);
        assert_eq!(
            &buf[..len],
            &[
                0x20,
                0x1E,
                0x8C,
                0x41,
                checksum(0x8C41),
                0x12,
                0x34,
                checksum(0x1234)
            ]
        );
    }

    #[test]
    fn test_encode_overflow() {
        let mut buf = [0u8; 4];
        assert_eq!(
            SET_IAQ_BASELINE.encode(&[1, 2], &mut buf),
            Err(FrameError::Length {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn test_with_settle_ms() {
        let cmd = MEASURE_RAW.with_settle_ms(30);
        assert_eq!(cmd.code, MEASURE_RAW.code);
        assert_eq!(cmd.settle_ms, 30);
    }
}
