//! SensorPoller: the single worker that owns the sensor's bus traffic.
//!
//! Each transaction walks the same phases:
//!
//! ```text
//! Idle -> CommandSent -> AwaitingResponse -> FrameReceived -> Decoded
//!                                                          -> ChecksumMismatch
//! ```
//!
//! A failed write or a short/failed read ends in [`Phase::Failed`] instead.
//! Waits go through the injected [`DelayNs`] timer, so the sequence can be
//! driven on the host without real time passing.

use embedded_hal_async::delay::DelayNs;
use sgp_proto::{
    decode_words, Command, FrameError, Word, MAX_COMMAND_LEN, MAX_FRAME_LEN, SELF_TEST_FAIL,
    SELF_TEST_PASS, WORD_LEN,
};

use crate::bus::{BusError, SensorBus};
use crate::config::{ChecksumPolicy, DeviceConfig};
use crate::telemetry::{BaselineParams, Channel, Telemetry};

/// Where the current transaction is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    CommandSent,
    AwaitingResponse,
    FrameReceived,
    Decoded,
    ChecksumMismatch,
    Failed,
}

/// Step of the init sequence or read cycle that a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    Init,
    SetBaseline,
    MeasureIaq,
    MeasureRaw,
    Baseline,
    InceptiveBaseline,
}

/// A transport failure that aborted the init sequence or a read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleError {
    pub stage: Stage,
    pub error: BusError,
}

/// Error type for one-shot device commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Transport failure.
    Bus(BusError),
    /// Response word failed its checksum.
    Checksum {
        value: u16,
        received: u8,
        computed: u8,
    },
    /// Well-formed response with an unexpected value.
    InvalidResponse(u16),
}

impl From<BusError> for DeviceError {
    fn from(err: BusError) -> Self {
        DeviceError::Bus(err)
    }
}

/// Result of the built-in self test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelfTest {
    Passed,
    Failed,
}

/// Baseline words read back from the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaselineReport {
    pub co2eq: Word,
    pub tvoc: Word,
    pub tvoc_inceptive: Word,
}

/// Per-value outcome of one read cycle.
///
/// Values tagged [`Word::ChecksumError`] were not published unless the
/// configured policy is [`ChecksumPolicy::Publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub co2eq: Word,
    pub tvoc: Word,
    pub raw_h2: Word,
    pub raw_ethanol: Word,
    /// Present on cycles where the baselines were due.
    pub baseline: Option<BaselineReport>,
}

impl CycleReport {
    /// Number of values whose checksum did not match.
    #[must_use]
    pub fn checksum_errors(&self) -> usize {
        let measured = [self.co2eq, self.tvoc, self.raw_h2, self.raw_ethanol];
        let baseline = self
            .baseline
            .map(|b| [b.co2eq, b.tvoc, b.tvoc_inceptive])
            .unwrap_or([Word::Valid(0); 3]);
        measured
            .iter()
            .chain(baseline.iter())
            .filter(|w| !w.is_valid())
            .count()
    }
}

/// Drives the sensor: command sequencing, decoding and publishing.
pub struct SensorPoller<'a, B, D> {
    bus: B,
    delay: D,
    config: DeviceConfig,
    telemetry: &'a Telemetry,
    params: &'a BaselineParams,
    phase: Phase,
    cycle: u32,
}

impl<'a, B: SensorBus, D: DelayNs> SensorPoller<'a, B, D> {
    /// Create a poller. Nothing is sent until [`init`](Self::init) or
    /// [`run`](Self::run).
    pub fn new(
        bus: B,
        delay: D,
        config: DeviceConfig,
        telemetry: &'a Telemetry,
        params: &'a BaselineParams,
    ) -> Self {
        Self {
            bus,
            delay,
            config,
            telemetry,
            params,
            phase: Phase::Idle,
            cycle: 0,
        }
    }

    /// Initialize the sensor, then poll forever.
    ///
    /// Errors are logged and counted; none escape. This method never returns.
    pub async fn run(&mut self) -> ! {
        if let Err(e) = self.init().await {
            error!("SGP init failed: {:?}", e);
        }
        loop {
            let _ = self.tick().await;
        }
    }

    /// Run one read cycle, then wait the inter-cycle period.
    ///
    /// Returns the cycle's report, or the stage and error that aborted it.
    pub async fn tick(&mut self) -> Result<CycleReport, CycleError> {
        let result = self.run_cycle().await;
        match &result {
            Ok(report) => trace!("Cycle done: {:?}", report),
            Err(e) => warn!("Cycle aborted: {:?}", e),
        }
        self.delay.delay_ms(self.config.cycle_period_ms).await;
        self.phase = Phase::Idle;
        result
    }

    /// Start the air-quality algorithm and restore the baseline if seeded.
    ///
    /// A failure is counted as a transport error.
    pub async fn init(&mut self) -> Result<(), CycleError> {
        let result = self.start().await;
        if result.is_err() {
            self.telemetry.record_transport_error();
        }
        result
    }

    async fn start(&mut self) -> Result<(), CycleError> {
        let commands = self.config.commands;
        info!("Initializing SGP at {:#x}", self.config.address);

        self.command(&commands.iaq_init, &[])
            .await
            .map_err(|error| CycleError {
                stage: Stage::Init,
                error,
            })?;

        if let Some((tvoc, co2eq)) = self.params.seed() {
            self.command(&commands.set_baseline, &[tvoc, co2eq])
                .await
                .map_err(|error| CycleError {
                    stage: Stage::SetBaseline,
                    error,
                })?;
            info!("Baseline restored: tvoc={} co2eq={}", tvoc, co2eq);
        }
        Ok(())
    }

    /// Run one read cycle without the trailing wait.
    ///
    /// A transport failure aborts the rest of the cycle; values already
    /// decoded in this cycle stay published, everything else keeps its
    /// previous value. Nothing is retried until the next cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        self.cycle = self.cycle.wrapping_add(1);
        self.telemetry.record_cycle();

        let result = self.measure().await;
        if result.is_err() {
            self.telemetry.record_transport_error();
        }
        result
    }

    async fn measure(&mut self) -> Result<CycleReport, CycleError> {
        let commands = self.config.commands;

        let [co2eq, tvoc] = self
            .transact::<2>(&commands.measure_iaq)
            .await
            .map_err(|error| CycleError {
                stage: Stage::MeasureIaq,
                error,
            })?;
        self.publish(Channel::Co2eq, co2eq);
        self.publish(Channel::Tvoc, tvoc);

        let [raw_h2, raw_ethanol] = self
            .transact::<2>(&commands.measure_raw)
            .await
            .map_err(|error| CycleError {
                stage: Stage::MeasureRaw,
                error,
            })?;
        self.publish(Channel::RawH2, raw_h2);
        self.publish(Channel::RawEthanol, raw_ethanol);

        let baseline = if self.baseline_due() {
            Some(self.read_baseline().await?)
        } else {
            None
        };

        debug!(
            "co2eq={} tvoc={} h2={} ethanol={}",
            co2eq.raw(),
            tvoc.raw(),
            raw_h2.raw(),
            raw_ethanol.raw()
        );

        Ok(CycleReport {
            co2eq,
            tvoc,
            raw_h2,
            raw_ethanol,
            baseline,
        })
    }

    fn baseline_due(&self) -> bool {
        let interval = self.config.baseline_interval;
        interval != 0 && self.cycle % interval == 0
    }

    /// Read and publish the IAQ baselines and the TVOC inceptive baseline.
    pub async fn read_baseline(&mut self) -> Result<BaselineReport, CycleError> {
        let commands = self.config.commands;

        let [co2eq, tvoc] = self
            .transact::<2>(&commands.get_baseline)
            .await
            .map_err(|error| CycleError {
                stage: Stage::Baseline,
                error,
            })?;
        self.publish(Channel::Co2eqBaseline, co2eq);
        self.publish(Channel::TvocBaseline, tvoc);

        let [tvoc_inceptive] = self
            .transact::<1>(&commands.get_inceptive_baseline)
            .await
            .map_err(|error| CycleError {
                stage: Stage::InceptiveBaseline,
                error,
            })?;
        self.publish(Channel::TvocInceptiveBaseline, tvoc_inceptive);

        Ok(BaselineReport {
            co2eq,
            tvoc,
            tvoc_inceptive,
        })
    }

    /// Read the 48-bit serial number. Used to detect the sensor.
    pub async fn probe(&mut self) -> Result<u64, DeviceError> {
        let command = self.config.commands.serial_id;
        let words = self.transact::<3>(&command).await?;

        let mut serial = 0u64;
        for word in words {
            serial = (serial << 16) | u64::from(require_valid(word)?);
        }
        info!("SGP serial: {:#x}", serial);
        Ok(serial)
    }

    /// Run the on-chip self test.
    pub async fn self_test(&mut self) -> Result<SelfTest, DeviceError> {
        let command = self.config.commands.self_test;
        let [word] = self.transact::<1>(&command).await?;
        match require_valid(word)? {
            SELF_TEST_PASS => Ok(SelfTest::Passed),
            SELF_TEST_FAIL => Ok(SelfTest::Failed),
            other => Err(DeviceError::InvalidResponse(other)),
        }
    }

    /// Switch the hotplate off. The sensor idles until the next init.
    pub async fn heater_off(&mut self) -> Result<(), DeviceError> {
        let command = self.config.commands.heater_off;
        self.command(&command, &[]).await?;
        Ok(())
    }

    pub async fn soft_reset(&mut self) -> Result<(), DeviceError> {
        let command = self.config.commands.soft_reset;
        self.command(&command, &[]).await?;
        Ok(())
    }

    /// Current transaction phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Get a reference to the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a reference to the timer.
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Decompose the poller into its bus and timer.
    pub fn into_parts(self) -> (B, D) {
        (self.bus, self.delay)
    }

    fn publish(&self, channel: Channel, word: Word) {
        match word {
            Word::Valid(value) => self.telemetry.store(channel, value),
            Word::ChecksumError {
                value,
                received,
                computed,
            } => {
                warn!(
                    "{:?} checksum mismatch: value={} received={:#x} computed={:#x}",
                    channel, value, received, computed
                );
                self.telemetry.record_checksum_error();
                if self.config.checksum_policy == ChecksumPolicy::Publish {
                    self.telemetry.store(channel, value);
                }
            }
        }
    }

    /// Write `command` with `params`, then wait its settle delay.
    async fn send(&mut self, command: &Command, params: &[u16]) -> Result<(), BusError> {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        let len = match command.encode(params, &mut buf) {
            Ok(len) => len,
            Err(e) => {
                self.phase = Phase::Failed;
                warn!("Cannot encode {:?}: {:?}", command.code, e);
                return Err(BusError::InvalidCommand);
            }
        };

        if let Err(e) = self.bus.write(self.config.address, &buf[..len]).await {
            self.phase = Phase::Failed;
            debug!("Write {:?} failed: {:?}", command.code, e);
            return Err(e);
        }
        self.phase = Phase::CommandSent;
        trace!("Sent {:?}", command.code);

        if command.settle_ms > 0 {
            self.phase = Phase::AwaitingResponse;
            self.delay.delay_ms(command.settle_ms).await;
        }
        Ok(())
    }

    /// A command without a response.
    async fn command(&mut self, command: &Command, params: &[u16]) -> Result<(), BusError> {
        self.send(command, params).await?;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// A command followed by an `N`-word response.
    ///
    /// A command configured with any other response size is rejected before
    /// it reaches the bus.
    async fn transact<const N: usize>(&mut self, command: &Command) -> Result<[Word; N], BusError> {
        if command.response_words != N {
            self.phase = Phase::Failed;
            warn!(
                "{:?} answers {} words, expected {}",
                command.code, command.response_words, N
            );
            return Err(BusError::InvalidCommand);
        }
        self.send(command, &[]).await?;

        let expected = N * WORD_LEN;
        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = &mut buf[..expected];

        let actual = match self.bus.read(self.config.address, frame).await {
            Ok(n) => n,
            Err(e) => {
                self.phase = Phase::Failed;
                return Err(e);
            }
        };
        if actual != expected {
            self.phase = Phase::Failed;
            return Err(BusError::ShortRead { expected, actual });
        }
        self.phase = Phase::FrameReceived;

        let words = decode_words::<N>(frame).map_err(|FrameError::Length { expected, actual }| {
            BusError::ShortRead { expected, actual }
        })?;
        self.phase = if words.iter().all(|w| w.is_valid()) {
            Phase::Decoded
        } else {
            Phase::ChecksumMismatch
        };
        Ok(words)
    }
}

fn require_valid(word: Word) -> Result<u16, DeviceError> {
    match word {
        Word::Valid(value) => Ok(value),
        Word::ChecksumError {
            value,
            received,
            computed,
        } => Err(DeviceError::Checksum {
            value,
            received,
            computed,
        }),
    }
}
