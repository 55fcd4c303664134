//! GPIO / peripheral pin assignments for the node board (ESP32-S3).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// User LED (blink output)
// ---------------------------------------------------------------------------

/// Blink LED, wired active-low (pin LOW = LED on).
pub const LED_GPIO: i32 = 11;

// ---------------------------------------------------------------------------
// User button (active-low with external pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button; falling edge raises the ISR.
pub const BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// I²C bus (LM75B temperature, MMA7660 accelerometer)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// Both sensors support fast mode, but 100 kHz keeps long wires happy.
pub const I2C_FREQ_HZ: u32 = 100_000;
