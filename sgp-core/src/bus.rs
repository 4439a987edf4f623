//! Bus transaction trait and error types.

use core::future::Future;

/// Error type for bus transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Device did not acknowledge its address or a data byte.
    Nack,
    /// Read returned a different number of bytes than requested.
    ShortRead { expected: usize, actual: usize },
    /// Transaction did not complete in time.
    Timeout,
    /// Lost arbitration to another controller.
    Arbitration,
    /// Bus-level fault (misplaced START/STOP, overrun).
    Bus,
    /// The command cannot be carried out as configured: too many parameter
    /// words, or a response size the caller does not expect. Nothing was sent.
    InvalidCommand,
    /// Anything the driver could not classify.
    Other,
}

/// Async trait for the two-wire bus the sensor sits on.
///
/// The poller is the only caller for its device address. Implementations own
/// any transaction timeout.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait SensorBus {
    /// Write a command (code plus optional parameter words) to `address`.
    fn write(&mut self, address: u8, bytes: &[u8]) -> impl Future<Output = Result<(), BusError>>;

    /// Read a response from `address` into `buf`.
    ///
    /// Returns the number of bytes actually received.
    fn read(
        &mut self,
        address: u8,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<usize, BusError>>;
}

impl<T: SensorBus + ?Sized> SensorBus for &mut T {
    async fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError> {
        (**self).write(address, bytes).await
    }

    async fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        (**self).read(address, buf).await
    }
}
