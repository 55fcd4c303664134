//! cloudnode firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SensorHub (I²C)   GpioPulseOutput   NvsAdapter   MonotonicClock│
//! │  (SensorPort)      (DigitalOutput)   (Config+Cred) (Clock)     │
//! │  SimulatedTransport                  LogEventSink              │
//! │  (Transport)                         (EventSink)               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            EventDispatcher (pure logic)                │    │
//! │  │  Registry · BlinkSequencer · RegistrationMachine       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Button ISR ──▶ ButtonLatch (atomics)                          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use cloudnode::adapters::log_sink::LogEventSink;
use cloudnode::adapters::nvs::NvsAdapter;
use cloudnode::adapters::time::MonotonicClock;
use cloudnode::adapters::transport::SimulatedTransport;
use cloudnode::app::commands::AppCommand;
use cloudnode::app::dispatcher::{EventDispatcher, LoopControl};
use cloudnode::app::ports::{Clock, ConfigPort};
use cloudnode::config::NodeConfig;
use cloudnode::drivers::button::BUTTON_LATCH;
use cloudnode::drivers::hw_init;
use cloudnode::drivers::pulse::GpioPulseOutput;
use cloudnode::fsm::RegistrationState;
use cloudnode::pins;
use cloudnode::scheduler::IntervalTimer;
use cloudnode::sensors::accel::{Accelerometer, MMA7660_DEFAULT_ADDR};
use cloudnode::sensors::temperature::{TemperatureSensor, LM75B_DEFAULT_ADDR};
use cloudnode::sensors::SensorHub;

/// How often a failed or not-yet-started registration is retried.
const REGISTRATION_RETRY_MS: u32 = 30_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("cloudnode v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), cannot read credentials", e);
            return Err(anyhow::anyhow!("NVS unavailable: {e}"));
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            NodeConfig::default()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    // Pin numbers mirror `pins`; the HAL needs the typed pin objects.
    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut sensors = SensorHub::new(
        i2c,
        TemperatureSensor::new(LM75B_DEFAULT_ADDR),
        Accelerometer::new(MMA7660_DEFAULT_ADDR),
    );

    let led = PinDriver::output(peripherals.pins.gpio11)?;
    let output = GpioPulseOutput::new(led, config.led_active_low);

    hw_init::init_button_isr()?;

    // ── 4. Core ───────────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut transport = SimulatedTransport::new();
    let mut dispatcher = EventDispatcher::new(config.clone(), output)?;
    dispatcher.start(&mut sink);

    if let Err(e) = dispatcher.start_registration(&nvs, &mut transport, &mut sink) {
        warn!("registration deferred: {}", e);
    }
    let mut retry = IntervalTimer::new("registration-retry", REGISTRATION_RETRY_MS);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.now_ms();

        let control = dispatcher.tick(now_ms, &BUTTON_LATCH, &mut sensors, &mut transport, &mut sink);
        if control == LoopControl::Exit {
            break;
        }

        // Retry policy lives here, not in the core.
        if retry.poll(now_ms) {
            match dispatcher.registration_state() {
                RegistrationState::Failed => {
                    dispatcher.handle_command(AppCommand::ResetRegistration, now_ms, &mut transport, &mut sink);
                    if let Err(e) = dispatcher.start_registration(&nvs, &mut transport, &mut sink) {
                        warn!("registration retry deferred: {}", e);
                    }
                }
                RegistrationState::Disconnected => {
                    if let Err(e) = dispatcher.start_registration(&nvs, &mut transport, &mut sink) {
                        warn!("registration retry deferred: {}", e);
                    }
                }
                _ => {}
            }
        }

        FreeRtos::delay_ms(config.loop_interval_ms);
    }

    info!("Deregistered. Control loop finished.");
    Ok(())
}
