//! Output drivers, the button latch, and hardware initialisation.

pub mod blink;
pub mod button;
pub mod hw_init;
pub mod pulse;
