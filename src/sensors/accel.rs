//! MMA7660 3-axis accelerometer (I²C, 6-bit, ±1.5 g).
//!
//! Registers 0x00..0x02 hold X, Y, Z as 6-bit two's complement values.
//! Bit 6 (`ALERT`) is set when the sample was being updated during the
//! read; the datasheet says to discard it and read again.  The device
//! powers up in standby, so [`Accelerometer::init`] writes active mode.

use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const MMA7660_DEFAULT_ADDR: u8 = 0x4C;

const REG_XOUT: u8 = 0x00;
const REG_MODE: u8 = 0x07;
const MODE_ACTIVE: u8 = 0x01;
const ALERT_BIT: u8 = 0x40;
const COUNTS_PER_G: f32 = 21.33;

pub struct Accelerometer {
    address: u8,
    active: bool,
}

impl Accelerometer {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            active: false,
        }
    }

    /// Put the device in active (measuring) mode.
    pub fn init<B: I2c>(&mut self, bus: &mut B) -> Result<(), SensorError> {
        bus.write(self.address, &[REG_MODE, MODE_ACTIVE])
            .map_err(|_| SensorError::BusError)?;
        self.active = true;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Read acceleration in g, `[x, y, z]`.
    pub fn read<B: I2c>(&mut self, bus: &mut B) -> Result<[f32; 3], SensorError> {
        if !self.active {
            self.init(bus)?;
        }
        let mut buf = [0u8; 3];
        bus.write_read(self.address, &[REG_XOUT], &mut buf)
            .map_err(|_| SensorError::BusError)?;

        let mut out = [0.0f32; 3];
        for (axis, reg) in out.iter_mut().zip(buf) {
            *axis = counts_to_g(reg)?;
        }
        Ok(out)
    }
}

/// Decode one axis register.  `NotReady` when the alert bit is set.
pub fn counts_to_g(reg: u8) -> Result<f32, SensorError> {
    if reg & ALERT_BIT != 0 {
        return Err(SensorError::NotReady);
    }
    // Sign-extend bit 5.
    let counts = ((reg << 2) as i8) >> 2;
    Ok(f32::from(counts) / COUNTS_PER_G)
}
