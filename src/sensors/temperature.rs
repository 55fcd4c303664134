//! LM75B digital temperature sensor (I²C, 11-bit, 0.125 °C/LSB).
//!
//! The temperature register (0x00) holds a left-aligned two's-complement
//! value: the top 11 bits of a big-endian 16-bit word.  The sensor
//! converts continuously after power-up, so a read is a single
//! `write_read`.

use embedded_hal::i2c::I2c;

use crate::error::SensorError;

/// Default 7-bit address with A2..A0 tied low.
pub const LM75B_DEFAULT_ADDR: u8 = 0x48;

const REG_TEMP: u8 = 0x00;
const CELSIUS_PER_LSB: f32 = 0.125;

pub struct TemperatureSensor {
    address: u8,
}

impl TemperatureSensor {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Read the current temperature in °C.
    pub fn read<B: I2c>(&self, bus: &mut B) -> Result<f32, SensorError> {
        let mut buf = [0u8; 2];
        bus.write_read(self.address, &[REG_TEMP], &mut buf)
            .map_err(|_| SensorError::BusError)?;
        Ok(raw_to_celsius(buf))
    }
}

/// Convert the big-endian register pair to °C.
pub fn raw_to_celsius(reg: [u8; 2]) -> f32 {
    // Arithmetic shift keeps the sign of the 11-bit value.
    let raw = i16::from_be_bytes(reg) >> 5;
    f32::from(raw) * CELSIUS_PER_LSB
}
