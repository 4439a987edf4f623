#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use sgp_deck_rp2040::{
    i2c_config, log_vars, new_poller, register_vars, BaselineParams, DeckPoller, DeckVars,
    DeviceConfig, SharedI2c, Telemetry,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

/// Published sensor values. Written only by the sensor task.
static TELEMETRY: Telemetry = Telemetry::new();

/// Baseline seeds, settable through the parameter registry before init.
static BASELINE: BaselineParams = BaselineParams::new();

/// I²C1, shared with any other device on the deck connector.
static I2C_BUS: StaticCell<SharedI2c> = StaticCell::new();

const LOG_PERIOD: Duration = Duration::from_secs(1);

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SGP deck starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- I2C Setup ---
    let i2c = I2c::new_async(
        p.I2C1,
        p.PIN_3, // SCL
        p.PIN_2, // SDA
        Irqs,
        i2c_config(),
    );
    let bus = I2C_BUS.init(Mutex::new(i2c));

    // --- Variable registration ---
    let vars = match register_vars(&TELEMETRY, &BASELINE) {
        Ok(vars) => vars,
        Err(e) => {
            error!("Variable registration failed: {:?}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let mut poller = new_poller(bus, DeviceConfig::default(), &TELEMETRY, &BASELINE);

    // Deck test: a sensor that answers with a valid serial number is present.
    match poller.probe().await {
        Ok(serial) => info!("SGP detected, serial {=u64:#x}", serial),
        Err(e) => warn!("SGP not detected: {:?}", e),
    }

    // Optional: LED for error indication (on-board LED on Pico)
    let led = Output::new(p.PIN_25, Level::Low);

    spawner.spawn(sensor_task(poller).unwrap());
    spawner.spawn(log_task(vars, led).unwrap());

    info!("SGP deck initialized, polling...");
}

/// Sensor task - the single worker driving the bus transactions.
#[embassy_executor::task]
async fn sensor_task(mut poller: DeckPoller) {
    poller.run().await
}

/// Log task - prints the registered variables and blinks on new errors.
#[embassy_executor::task]
async fn log_task(vars: DeckVars, mut led: Output<'static>) {
    let mut last_errors = 0;
    loop {
        Timer::after(LOG_PERIOD).await;
        log_vars(&vars);

        let snapshot = TELEMETRY.snapshot();
        let errors = snapshot.checksum_errors.wrapping_add(snapshot.transport_errors);
        if errors != last_errors {
            warn!(
                "SGP errors: checksum={} transport={}",
                snapshot.checksum_errors, snapshot.transport_errors
            );
            led.toggle();
            last_errors = errors;
        }
    }
}
