//! Device configuration: bus address, command codes and timing.

use sgp_proto::command::{
    Command, DEFAULT_ADDRESS, EXECUTE_SELF_TEST, GET_IAQ_BASELINE, GET_SERIAL_ID,
    GET_TVOC_INCEPTIVE_BASELINE, IAQ_INIT, MEASURE_IAQ, MEASURE_RAW, SET_IAQ_BASELINE,
    SOFT_RESET, TURN_HEATER_OFF,
};

/// Command used for each sensor operation.
///
/// Override individual entries to target a sensor variant whose codes or
/// timings differ from the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandSet {
    pub iaq_init: Command,
    pub measure_iaq: Command,
    pub measure_raw: Command,
    pub get_baseline: Command,
    pub set_baseline: Command,
    pub get_inceptive_baseline: Command,
    pub self_test: Command,
    pub heater_off: Command,
    pub serial_id: Command,
    pub soft_reset: Command,
}

impl CommandSet {
    pub const DEFAULT: Self = Self {
        iaq_init: IAQ_INIT,
        measure_iaq: MEASURE_IAQ,
        measure_raw: MEASURE_RAW,
        get_baseline: GET_IAQ_BASELINE,
        set_baseline: SET_IAQ_BASELINE,
        get_inceptive_baseline: GET_TVOC_INCEPTIVE_BASELINE,
        self_test: EXECUTE_SELF_TEST,
        heater_off: TURN_HEATER_OFF,
        serial_id: GET_SERIAL_ID,
        soft_reset: SOFT_RESET,
    };
}

impl Default for CommandSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What to do with a value whose checksum did not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumPolicy {
    /// Keep the previously published value.
    #[default]
    Discard,
    /// Publish the value anyway. The error is still counted and reported.
    Publish,
}

/// Full driver configuration.
///
/// # Example
///
/// ```
/// use sgp_core::{ChecksumPolicy, DeviceConfig};
///
/// let config = DeviceConfig::default()
///     .with_cycle_period_ms(2000)
///     .with_checksum_policy(ChecksumPolicy::Publish);
/// assert_eq!(config.address, 0x59);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// 7-bit bus address.
    pub address: u8,
    pub commands: CommandSet,
    /// Wait between the end of one read cycle and the start of the next.
    pub cycle_period_ms: u32,
    /// Read the baselines every this many cycles. `0` disables baseline reads.
    pub baseline_interval: u32,
    pub checksum_policy: ChecksumPolicy,
}

impl DeviceConfig {
    pub const DEFAULT: Self = Self {
        address: DEFAULT_ADDRESS,
        commands: CommandSet::DEFAULT,
        cycle_period_ms: 1000,
        baseline_interval: 60,
        checksum_policy: ChecksumPolicy::Discard,
    };

    #[must_use]
    pub const fn with_address(self, address: u8) -> Self {
        Self { address, ..self }
    }

    #[must_use]
    pub const fn with_commands(self, commands: CommandSet) -> Self {
        Self { commands, ..self }
    }

    #[must_use]
    pub const fn with_cycle_period_ms(self, cycle_period_ms: u32) -> Self {
        Self {
            cycle_period_ms,
            ..self
        }
    }

    #[must_use]
    pub const fn with_baseline_interval(self, baseline_interval: u32) -> Self {
        Self {
            baseline_interval,
            ..self
        }
    }

    #[must_use]
    pub const fn with_checksum_policy(self, checksum_policy: ChecksumPolicy) -> Self {
        Self {
            checksum_policy,
            ..self
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let config = DeviceConfig::default();
        assert_eq!(config.commands.measure_raw.settle_ms, 25);
        assert_eq!(config.commands.iaq_init.settle_ms, 10);
        assert_eq!(config.commands.measure_iaq.response_len(), 6);
        assert_eq!(config.checksum_policy, ChecksumPolicy::Discard);
    }

    #[test]
    fn test_builders_leave_other_fields() {
        let config = DeviceConfig::DEFAULT
            .with_address(0x58)
            .with_baseline_interval(0);
        assert_eq!(config.address, 0x58);
        assert_eq!(config.baseline_interval, 0);
        assert_eq!(
            config.cycle_period_ms,
            DeviceConfig::DEFAULT.cycle_period_ms
        );
        assert_eq!(config.commands, CommandSet::DEFAULT);
    }
}
