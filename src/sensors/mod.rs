//! Sensor subsystem: individual I²C drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the shared bus and every driver on it, and implements
//! [`SensorPort`] so the dispatcher can sample it without knowing about
//! I²C at all.

pub mod accel;
pub mod temperature;

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use accel::Accelerometer;
use temperature::TemperatureSensor;

/// What a sample measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// °C.
    Temperature(f32),
    /// g, `[x, y, z]`.
    Acceleration([f32; 3]),
}

/// A reading plus the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub timestamp_ms: u64,
    pub reading: Reading,
}

impl SensorSample {
    pub fn new(timestamp_ms: u64, reading: Reading) -> Self {
        Self {
            timestamp_ms,
            reading,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.reading {
            Reading::Temperature(_) => "temperature",
            Reading::Acceleration(_) => "acceleration",
        }
    }
}

/// Owns the I²C bus and the drivers attached to it.
pub struct SensorHub<B: I2c> {
    bus: B,
    temperature: TemperatureSensor,
    accel: Accelerometer,
}

impl<B: I2c> SensorHub<B> {
    /// Construct a hub and try to wake the accelerometer.  A failure here
    /// is logged and retried on the first read.
    pub fn new(mut bus: B, temperature: TemperatureSensor, mut accel: Accelerometer) -> Self {
        if let Err(e) = accel.init(&mut bus) {
            warn!("sensors: accelerometer init failed ({}), will retry", e);
        }
        Self {
            bus,
            temperature,
            accel,
        }
    }

    /// Release the bus (e.g. to hand it to another driver in tests).
    pub fn into_bus(self) -> B {
        self.bus
    }
}

impl<B: I2c> SensorPort for SensorHub<B> {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.temperature.read(&mut self.bus)
    }

    fn read_acceleration(&mut self) -> Result<[f32; 3], SensorError> {
        self.accel.read(&mut self.bus)
    }
}
