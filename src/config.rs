//! Node configuration parameters
//!
//! All tunable parameters for the CloudNode firmware.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Timing ---
    /// Control loop period (milliseconds)
    pub loop_interval_ms: u32,
    /// Temperature / acceleration sampling period (milliseconds)
    pub sensor_interval_ms: u32,

    // --- Blink output ---
    /// Width of a single LED pulse (milliseconds)
    pub pulse_width_ms: u32,
    /// LED is lit when the GPIO is driven low
    pub led_active_low: bool,
    /// Pattern stored in the pattern resource at boot
    pub default_pattern: heapless::String<64>,

    // --- Transport ---
    /// Upper bound on transport events handled per loop iteration
    pub max_transport_events_per_tick: u8,
}

/// Pattern stored in the blink-pattern resource until a remote write.
pub const DEFAULT_BLINK_PATTERN: &str = "500:500:500:500";

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Timing
            loop_interval_ms: 100,
            sensor_interval_ms: 5000, // 0.2 Hz

            // Blink
            pulse_width_ms: 20,
            led_active_low: true,
            default_pattern: heapless::String::try_from(DEFAULT_BLINK_PATTERN).unwrap_or_default(),

            // Transport
            max_transport_events_per_tick: 8,
        }
    }
}
