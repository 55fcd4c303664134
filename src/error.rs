//! Unified error types for the CloudNode firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be handed back to the remote caller or logged without allocation.
//! Nothing in here is fatal: registry errors go back to whoever asked,
//! comms errors become registration events, sensor errors skip a sample.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A resource registry operation was rejected.
    Registry(RegistryError),
    /// A sensor could not be read.
    Sensor(SensorError),
    /// The transport collaborator reported a failure.
    Comms(CommsError),
    /// A precondition for startup was not met.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

/// Rejections from the resource registry.  Returned to the caller (local
/// code or the remote manager), never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Path text is not an `Object/Instance/Resource` triplet.
    InvalidPath,
    /// A resource with this path already exists.
    DuplicatePath,
    /// The resource does not permit the requested method.
    MethodNotAllowed,
    /// No resource is registered under this path or handle.
    UnknownResource,
    /// The fixed-capacity resource table is full.
    RegistryFull,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath => write!(f, "invalid resource path"),
            Self::DuplicatePath => write!(f, "duplicate resource path"),
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::UnknownResource => write!(f, "unknown resource"),
            Self::RegistryFull => write!(f, "resource table full"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The I2C transaction failed.
    BusError,
    /// The device answered but flagged the sample as unstable.
    NotReady,
    /// No driver is attached for this quantity.
    Unavailable,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusError => write!(f, "I2C transfer failed"),
            Self::NotReady => write!(f, "sample not ready"),
            Self::Unavailable => write!(f, "sensor unavailable"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Network bring-up or security handshake failed.
    ConnectFailed,
    /// The management server rejected the registration.
    RegistrationRejected,
    /// The collaborator gave up waiting for the server.
    Timeout,
    /// An established session dropped.
    ConnectionLost,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "transport connect failed"),
            Self::RegistrationRejected => write!(f, "registration rejected"),
            Self::Timeout => write!(f, "transport timeout"),
            Self::ConnectionLost => write!(f, "connection lost"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
