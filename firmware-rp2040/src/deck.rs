//! Deck wiring for the SGP sensor.
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | I2C1 SDA | 2    | Sensor data |
//! | I2C1 SCL | 3    | Sensor clock |
//! | LED      | 25   | On-board LED (error indicator) |
//!
//! I²C1 sits behind a mutex so other deck devices can share the bus; the
//! poller stays the only agent talking to the sensor's address.

use defmt::info;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_rp::i2c::{Async, Config as I2cConfig, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use sgp_core::{
    BaselineParams, DeviceConfig, I2cBus, RegistryError, SensorPoller, Telemetry, VarTable,
};

/// SGP sensors accept up to 400 kHz; stay at standard mode for long deck cables.
pub const I2C_FREQUENCY_HZ: u32 = 100_000;

/// Room for the telemetry channels, counters and baseline parameters.
pub const VAR_CAPACITY: usize = 16;

pub type DeckI2c = I2c<'static, I2C1, Async>;
pub type SharedI2c = Mutex<CriticalSectionRawMutex, DeckI2c>;
pub type DeckBus = I2cBus<I2cDevice<'static, CriticalSectionRawMutex, DeckI2c>>;
pub type DeckPoller = SensorPoller<'static, DeckBus, Delay>;
pub type DeckVars = VarTable<VAR_CAPACITY>;

/// I²C configuration for the deck connector.
#[must_use]
pub fn i2c_config() -> I2cConfig {
    let mut config = I2cConfig::default();
    config.frequency = I2C_FREQUENCY_HZ;
    config
}

/// Build the poller on the shared bus, using the embassy timer for waits.
#[must_use]
pub fn new_poller(
    bus: &'static SharedI2c,
    config: DeviceConfig,
    telemetry: &'static Telemetry,
    params: &'static BaselineParams,
) -> DeckPoller {
    let bus = I2cBus::new(I2cDevice::new(bus));
    SensorPoller::new(bus, Delay, config, telemetry, params)
}

/// Register the telemetry log group and the baseline parameter group.
pub fn register_vars(
    telemetry: &'static Telemetry,
    params: &'static BaselineParams,
) -> Result<DeckVars, RegistryError> {
    let mut vars = DeckVars::new();
    telemetry.register(&mut vars)?;
    params.register(&mut vars)?;
    Ok(vars)
}

/// Print every log variable.
pub fn log_vars(vars: &DeckVars) {
    for entry in vars.logs() {
        info!("{}.{} = {}", entry.group, entry.name, entry.var.load());
    }
}
