//! Platform-agnostic driver core for Sensirion SGP air-quality sensors.
//!
//! This crate holds everything between the bus and the host's telemetry log
//! without any platform-specific dependencies. It builds for embedded
//! `no_std` targets and on the host for testing.
//!
//! # Overview
//!
//! - [`bus`]: bus transaction trait ([`SensorBus`]) and [`BusError`]
//! - [`hal`]: [`SensorBus`] adapter for `embedded-hal-async` I²C ([`I2cBus`])
//! - [`config`]: address, command set and timing ([`DeviceConfig`])
//! - [`telemetry`]: published values ([`Telemetry`], [`BaselineParams`])
//! - [`registry`]: named log/parameter binding ([`Registry`], [`VarTable`])
//! - [`poller`]: the read cycle ([`SensorPoller`])
//!
//! # Read Cycle
//!
//! ```text
//! write MEASURE_IAQ -> wait 12 ms -> read 6 bytes -> co2eq, tvoc
//! write MEASURE_RAW -> wait 25 ms -> read 6 bytes -> rawh2, raweth
//! (every N cycles) read baselines
//! wait cycle period
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sgp_core::{BaselineParams, DeviceConfig, I2cBus, SensorPoller, Telemetry, VarTable};
//!
//! static TELEMETRY: Telemetry = Telemetry::new();
//! static BASELINE: BaselineParams = BaselineParams::new();
//!
//! let mut vars = VarTable::<16>::new();
//! TELEMETRY.register(&mut vars)?;
//! BASELINE.register(&mut vars)?;
//!
//! let bus = I2cBus::new(i2c);
//! let mut poller = SensorPoller::new(bus, delay, DeviceConfig::default(), &TELEMETRY, &BASELINE);
//! poller.run().await;
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log and format through defmt (for embedded targets)
//! - **`log`**: Log through the `log` facade
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod bus;
pub mod config;
pub mod hal;
pub mod poller;
pub mod registry;
pub mod telemetry;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use bus::{BusError, SensorBus};
pub use config::{ChecksumPolicy, CommandSet, DeviceConfig};
pub use hal::I2cBus;
pub use poller::{
    BaselineReport, CycleError, CycleReport, DeviceError, Phase, SelfTest, SensorPoller, Stage,
};
pub use registry::{Registry, RegistryError, VarEntry, VarKind, VarRef, VarTable};
pub use telemetry::{BaselineParams, Channel, Telemetry, TelemetrySnapshot};

pub use sgp_proto::Word;
