//! Published sensor state.
//!
//! [`Telemetry`] has exactly one writer, the poller. Any number of readers may
//! load individual channels or take a [`TelemetrySnapshot`]. Each field is an
//! atomic, so a single value never tears. A snapshot taken mid-cycle may mix
//! values from two consecutive cycles.

use portable_atomic::{AtomicU16, AtomicU32, Ordering};

use crate::registry::{Registry, RegistryError, VarEntry, VarKind, VarRef};

/// Log group the telemetry channels are registered under.
pub const LOG_GROUP: &str = "SGP40";

/// Parameter group the baseline seeds are registered under.
pub const PARAM_GROUP: &str = "SGP40Baseline";

/// A published 16-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Co2eq,
    Tvoc,
    RawH2,
    RawEthanol,
    Co2eqBaseline,
    TvocBaseline,
    TvocInceptiveBaseline,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Co2eq,
        Channel::Tvoc,
        Channel::RawH2,
        Channel::RawEthanol,
        Channel::Co2eqBaseline,
        Channel::TvocBaseline,
        Channel::TvocInceptiveBaseline,
    ];

    /// Registered log variable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Co2eq => "co2eq",
            Channel::Tvoc => "tvoc",
            Channel::RawH2 => "rawh2",
            Channel::RawEthanol => "raweth",
            Channel::Co2eqBaseline => "co2eqbl",
            Channel::TvocBaseline => "tvocbl",
            Channel::TvocInceptiveBaseline => "tvocibl",
        }
    }
}

/// Owned telemetry storage.
#[derive(Debug)]
pub struct Telemetry {
    values: [AtomicU16; 7],
    cycles: AtomicU32,
    checksum_errors: AtomicU32,
    transport_errors: AtomicU32,
}

/// Point-in-time copy of [`Telemetry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySnapshot {
    pub co2eq: u16,
    pub tvoc: u16,
    pub raw_h2: u16,
    pub raw_ethanol: u16,
    pub co2eq_baseline: u16,
    pub tvoc_baseline: u16,
    pub tvoc_inceptive_baseline: u16,
    pub cycles: u32,
    pub checksum_errors: u32,
    pub transport_errors: u32,
}

impl Telemetry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: [
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
                AtomicU16::new(0),
            ],
            cycles: AtomicU32::new(0),
            checksum_errors: AtomicU32::new(0),
            transport_errors: AtomicU32::new(0),
        }
    }

    #[inline]
    fn slot(&self, channel: Channel) -> &AtomicU16 {
        &self.values[channel as usize]
    }

    /// Latest published value of one channel.
    #[inline]
    #[must_use]
    pub fn get(&self, channel: Channel) -> u16 {
        self.slot(channel).load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            co2eq: self.get(Channel::Co2eq),
            tvoc: self.get(Channel::Tvoc),
            raw_h2: self.get(Channel::RawH2),
            raw_ethanol: self.get(Channel::RawEthanol),
            co2eq_baseline: self.get(Channel::Co2eqBaseline),
            tvoc_baseline: self.get(Channel::TvocBaseline),
            tvoc_inceptive_baseline: self.get(Channel::TvocInceptiveBaseline),
            cycles: self.cycles.load(Ordering::Relaxed),
            checksum_errors: self.checksum_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }

    /// Bind every channel and counter as a log variable.
    pub fn register<R: Registry>(&'static self, registry: &mut R) -> Result<(), RegistryError> {
        for channel in Channel::ALL {
            registry.add(VarEntry {
                kind: VarKind::Log,
                group: LOG_GROUP,
                name: channel.name(),
                var: VarRef::U16(self.slot(channel)),
            })?;
        }
        for (name, counter) in [
            ("cycles", &self.cycles),
            ("crcerr", &self.checksum_errors),
            ("buserr", &self.transport_errors),
        ] {
            registry.add(VarEntry {
                kind: VarKind::Log,
                group: LOG_GROUP,
                name,
                var: VarRef::U32(counter),
            })?;
        }
        Ok(())
    }

    // Writers below are crate-private: only the poller publishes. With a single
    // writer, load + store is enough for the counters.

    pub(crate) fn store(&self, channel: Channel, value: u16) {
        self.slot(channel).store(value, Ordering::Relaxed);
    }

    pub(crate) fn record_cycle(&self) {
        bump(&self.cycles);
    }

    pub(crate) fn record_checksum_error(&self) {
        bump(&self.checksum_errors);
    }

    pub(crate) fn record_transport_error(&self) {
        bump(&self.transport_errors);
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn bump(counter: &AtomicU32) {
    counter.store(
        counter.load(Ordering::Relaxed).wrapping_add(1),
        Ordering::Relaxed,
    );
}

/// Externally settable baseline seeds, consumed once at initialization.
///
/// Both values must be non-zero for the sensor baseline to be restored.
#[derive(Debug)]
pub struct BaselineParams {
    tvoc: AtomicU16,
    co2eq: AtomicU16,
}

impl BaselineParams {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_values(0, 0)
    }

    #[must_use]
    pub const fn with_values(tvoc: u16, co2eq: u16) -> Self {
        Self {
            tvoc: AtomicU16::new(tvoc),
            co2eq: AtomicU16::new(co2eq),
        }
    }

    pub fn set(&self, tvoc: u16, co2eq: u16) {
        self.tvoc.store(tvoc, Ordering::Relaxed);
        self.co2eq.store(co2eq, Ordering::Relaxed);
    }

    #[must_use]
    pub fn tvoc(&self) -> u16 {
        self.tvoc.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn co2eq(&self) -> u16 {
        self.co2eq.load(Ordering::Relaxed)
    }

    /// `(tvoc, co2eq)` if both seeds are set.
    #[must_use]
    pub fn seed(&self) -> Option<(u16, u16)> {
        match (self.tvoc(), self.co2eq()) {
            (0, _) | (_, 0) => None,
            pair => Some(pair),
        }
    }

    /// Bind both seeds as runtime parameters.
    pub fn register<R: Registry>(&'static self, registry: &mut R) -> Result<(), RegistryError> {
        registry.add(VarEntry {
            kind: VarKind::Param,
            group: PARAM_GROUP,
            name: "TVOC",
            var: VarRef::U16(&self.tvoc),
        })?;
        registry.add(VarEntry {
            kind: VarKind::Param,
            group: PARAM_GROUP,
            name: "CO2",
            var: VarRef::U16(&self.co2eq),
        })
    }
}

impl Default for BaselineParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VarTable;

    #[test]
    fn test_snapshot_reflects_stores() {
        let telemetry = Telemetry::new();
        telemetry.store(Channel::Co2eq, 400);
        telemetry.store(Channel::RawEthanol, 17_000);
        telemetry.record_cycle();
        telemetry.record_checksum_error();

        let snap = telemetry.snapshot();
        assert_eq!(snap.co2eq, 400);
        assert_eq!(snap.raw_ethanol, 17_000);
        assert_eq!(snap.tvoc, 0);
        assert_eq!(snap.cycles, 1);
        assert_eq!(snap.checksum_errors, 1);
        assert_eq!(snap.transport_errors, 0);
    }

    #[test]
    fn test_register_telemetry_names() {
        static TELEMETRY: Telemetry = Telemetry::new();
        TELEMETRY.store(Channel::Tvoc, 12);

        let mut table = VarTable::<16>::new();
        TELEMETRY.register(&mut table).unwrap();

        assert_eq!(table.len(), 10);
        assert_eq!(table.get(LOG_GROUP, "tvoc"), Ok(12));
        for channel in Channel::ALL {
            assert!(table.find(LOG_GROUP, channel.name()).is_some());
        }
        assert_eq!(
            table.set_param(LOG_GROUP, "co2eq", 1),
            Err(RegistryError::ReadOnly)
        );
    }

    #[test]
    fn test_register_into_small_table_fails() {
        static TELEMETRY: Telemetry = Telemetry::new();
        let mut table = VarTable::<4>::new();
        assert_eq!(TELEMETRY.register(&mut table), Err(RegistryError::Full));
    }

    #[test]
    fn test_baseline_seed_requires_both() {
        let params = BaselineParams::new();
        assert_eq!(params.seed(), None);
        params.set(0x8C41, 0);
        assert_eq!(params.seed(), None);
        params.set(0x8C41, 0x8F21);
        assert_eq!(params.seed(), Some((0x8C41, 0x8F21)));
    }

    #[test]
    fn test_baseline_params_settable_through_registry() {
        static PARAMS: BaselineParams = BaselineParams::new();
        let mut table = VarTable::<2>::new();
        PARAMS.register(&mut table).unwrap();

        table.set_param(PARAM_GROUP, "TVOC", 100).unwrap();
        table.set_param(PARAM_GROUP, "CO2", 200).unwrap();
        assert_eq!(PARAMS.seed(), Some((100, 200)));
    }
}
