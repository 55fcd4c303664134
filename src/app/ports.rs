//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ EventDispatcher (domain)
//! ```
//!
//! Driven adapters (transport, sensors, LED output, clock, config and
//! credential storage, event sinks) implement these traits.  The
//! [`EventDispatcher`](super::dispatcher::EventDispatcher) consumes them via
//! generics, so the domain core never touches hardware or sockets directly.
//!
//! Every port method is non-blocking: anything that takes time (a network
//! handshake, a server acknowledgement) is reported back later as a
//! [`TransportEvent`] polled from the control loop.

use crate::config::NodeConfig;
use crate::error::{CommsError, RegistryError, SensorError};
use crate::resource::{DeliveryStatus, ResourcePath};

// ───────────────────────────────────────────────────────────────
// Transport port (management-server session)
// ───────────────────────────────────────────────────────────────

/// Something the transport collaborator observed since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Network and security handshake completed.
    Ready,
    /// Bring-up or registration failed.
    Error(CommsError),
    /// The collaborator gave up waiting for the server.
    Timeout,
    /// The server accepted the registration.
    RegistrationAck,
    /// The server accepted the deregistration.
    DeregistrationAck,
    /// An established session dropped.
    ConnectionLost,
    /// Remote READ of a resource.
    RemoteRead { path: ResourcePath },
    /// Remote WRITE of a resource.
    RemoteWrite { path: ResourcePath, value: String },
    /// Remote EXECUTE of a resource.
    RemoteExecute { path: ResourcePath, arg: String },
    /// Delivery outcome of a previously sent notification.
    NotifyResult {
        path: ResourcePath,
        status: DeliveryStatus,
    },
}

/// Answer to a remote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteResponse<'a> {
    /// READ succeeded.
    Content(&'a str),
    /// WRITE committed.
    Changed,
    /// EXECUTE accepted (the work itself runs later on the control loop).
    Accepted,
    /// Request rejected.
    Rejected(RegistryError),
}

/// Session with the remote management server.
///
/// The wire protocol lives entirely behind this trait.  Requests are
/// fire-and-forget; outcomes come back through [`Transport::poll_event`].
pub trait Transport {
    /// Start network bring-up and the security handshake.
    fn connect(&mut self);

    /// Announce the device and its resources.
    fn register(&mut self, resources: &[ResourcePath]);

    /// Ask the server to drop the registration.
    fn deregister(&mut self);

    /// Send an observation notification with the resource's current value.
    fn notify(&mut self, path: &ResourcePath, value: &str);

    /// Reply to a remote READ / WRITE / EXECUTE.
    fn respond(&mut self, path: &ResourcePath, response: RemoteResponse<'_>);

    /// Take the next pending event, if any.  Must not block.
    fn poll_event(&mut self) -> Option<TransportEvent>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Temperature in °C.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Acceleration in g, `[x, y, z]`.
    fn read_acceleration(&mut self) -> Result<[f32; 3], SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Digital output port (driven adapter: domain → LED)
// ───────────────────────────────────────────────────────────────

/// Single on/off output used for blink pulses.
pub trait DigitalOutput {
    /// Drive the output.  `active` is the logical state; polarity is the
    /// adapter's business.
    fn set(&mut self, active: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Credential store port
// ───────────────────────────────────────────────────────────────

/// Mounted storage holding the device's server credentials.
pub trait CredentialStore {
    /// `true` once the store is mounted and credentials are present.
    fn is_ready(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Registration state changes and notification
/// delivery results reach the surrounding application this way.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists node configuration.
///
/// Implementations MUST validate config values before persisting and
/// reject invalid ranges with [`ConfigError::ValidationFailed`] rather
/// than clamping them.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`NodeConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<NodeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
