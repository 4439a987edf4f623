//! SGP air-quality sensor deck firmware for RP2040.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Probes the sensor by reading its serial number
//! 2. Starts the on-chip air-quality algorithm, restoring a seeded baseline
//! 3. Polls CO2eq/TVOC and raw H2/ethanol every second over I²C
//! 4. Publishes the values to named log variables
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with two tasks:
//!
//! - **Sensor Task**: the only writer; runs [`SensorPoller::run`]
//! - **Log Task**: reads the registered variables and prints them via defmt
//!
//! Telemetry lives in a `static` [`Telemetry`]; every value is an atomic, so
//! readers never see a torn value.
//!
//! # Modules
//!
//! - [`deck`]: pins, bus sharing, poller construction, variable registration
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//!
//! # Re-exports
//!
//! This crate re-exports the public items from [`sgp_core`] it needs, so the
//! binary only depends on this crate.

#![no_std]

// Ensure a single panic handler
#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they install conflicting panic handlers");

// Re-export core types for convenience
pub use sgp_core::{
    BaselineParams, ChecksumPolicy, CycleError, DeviceConfig, DeviceError, Phase, SensorPoller,
    Telemetry, TelemetrySnapshot,
};

pub mod deck;

pub use deck::{
    i2c_config, log_vars, new_poller, register_vars, DeckPoller, DeckVars, SharedI2c,
};
