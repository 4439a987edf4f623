//! [`SensorBus`] adapter for any `embedded-hal-async` I²C controller.

use embedded_hal_async::i2c::{Error as _, ErrorKind, I2c};

use crate::bus::{BusError, SensorBus};

/// Wraps an async I²C controller so the poller can drive it.
pub struct I2cBus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> I2cBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Get a mutable reference to the underlying controller.
    pub fn inner_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> SensorBus for I2cBus<I2C> {
    async fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.i2c
            .write(address, bytes)
            .await
            .map_err(|e| BusError::from(e.kind()))
    }

    async fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        self.i2c
            .read(address, buf)
            .await
            .map_err(|e| BusError::from(e.kind()))?;
        // I²C reads are clocked by the controller, so a completed read is full.
        Ok(buf.len())
    }
}

impl From<ErrorKind> for BusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => BusError::Nack,
            ErrorKind::ArbitrationLoss => BusError::Arbitration,
            ErrorKind::Bus | ErrorKind::Overrun => BusError::Bus,
            _ => BusError::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::block_on;
    use embedded_hal_async::i2c::{ErrorType, NoAcknowledgeSource, Operation};
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        reads: VecDeque<Result<Vec<u8>, ErrorKind>>,
        write_error: Option<ErrorKind>,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some(e) = self.write_error {
                            return Err(e);
                        }
                        self.writes.push((address, bytes.to_vec()));
                    }
                    Operation::Read(buf) => {
                        let data = self.reads.pop_front().unwrap_or(Err(ErrorKind::Other))?;
                        buf.copy_from_slice(&data[..buf.len()]);
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_forwards_bytes() {
        let mut bus = I2cBus::new(MockI2c::default());
        block_on(bus.write(0x59, &[0x20, 0x08])).unwrap();
        assert_eq!(bus.inner_mut().writes, vec![(0x59, vec![0x20, 0x08])]);
    }

    #[test]
    fn test_read_reports_full_length() {
        let mut i2c = MockI2c::default();
        i2c.reads.push_back(Ok(vec![1, 2, 3, 4, 5, 6]));
        let mut bus = I2cBus::new(i2c);

        let mut buf = [0u8; 6];
        assert_eq!(block_on(bus.read(0x59, &mut buf)), Ok(6));
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_nack_maps_to_bus_error() {
        let i2c = MockI2c {
            write_error: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            ..MockI2c::default()
        };
        let mut bus = I2cBus::new(i2c);
        assert_eq!(
            block_on(bus.write(0x59, &[0x20, 0x03])),
            Err(BusError::Nack)
        );
    }

    #[test]
    fn test_read_error_maps_to_bus_error() {
        let mut i2c = MockI2c::default();
        i2c.reads.push_back(Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)));
        i2c.reads.push_back(Err(ErrorKind::ArbitrationLoss));
        let mut bus = I2cBus::new(i2c);

        let mut buf = [0u8; 6];
        assert_eq!(block_on(bus.read(0x59, &mut buf)), Err(BusError::Nack));
        assert_eq!(
            block_on(bus.read(0x59, &mut buf)),
            Err(BusError::Arbitration)
        );
        // Nothing scripted: the controller reports an unclassified fault.
        assert_eq!(block_on(bus.read(0x59, &mut buf)), Err(BusError::Other));
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            BusError::from(ErrorKind::ArbitrationLoss),
            BusError::Arbitration
        );
        assert_eq!(BusError::from(ErrorKind::Overrun), BusError::Bus);
        assert_eq!(BusError::from(ErrorKind::Other), BusError::Other);
    }
}
