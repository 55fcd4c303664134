//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to               |
//! |-------------|-------------------|---------------------------|
//! | `log_sink`  | EventSink         | Serial log output         |
//! | `nvs`       | ConfigPort        | NVS / in-memory store     |
//! |             | CredentialStore   |                           |
//! | `time`      | Clock             | ESP32 system timer        |
//! | `transport` | Transport         | Loopback session          |
//!
//! Sensor and LED adapters live with their drivers
//! ([`SensorHub`](crate::sensors::SensorHub),
//! [`GpioPulseOutput`](crate::drivers::pulse::GpioPulseOutput)).

pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod transport;
