//! Single-pin pulse output.
//!
//! Wraps any `embedded-hal` [`OutputPin`] as a [`DigitalOutput`] for the
//! blink sequencer.  Polarity is configured once here so the sequencer
//! only deals in "active" / "inactive".  The reference board's LED is
//! wired active-low (pin LOW = LED on).

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::DigitalOutput;

pub struct GpioPulseOutput<P: OutputPin> {
    pin: P,
    active_low: bool,
    active: bool,
}

impl<P: OutputPin> GpioPulseOutput<P> {
    /// Wrap `pin` and drive it to the inactive level.
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut out = Self {
            pin,
            active_low,
            active: true,
        };
        out.set(false);
        out
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> DigitalOutput for GpioPulseOutput<P> {
    fn set(&mut self, active: bool) {
        let high = active != self.active_low;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.active = active,
            Err(_) => warn!("pulse output: pin write failed"),
        }
    }
}
