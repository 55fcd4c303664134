//! Shared mutable context threaded through every registration handler.
//!
//! Handlers never call the transport themselves.  They record what they
//! want done as [`TransportRequest`]s, and the dispatcher applies them after
//! the transition completes.

use log::warn;

// ---------------------------------------------------------------------------
// Requests to the transport (written by handlers; consumed by dispatcher)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportRequest {
    /// Start network bring-up and the security handshake.
    Connect,
    /// Announce the device and its resources.
    Register,
    /// Ask the server to drop the registration.
    Deregister,
}

/// At most one request is raised per transition; a little headroom covers
/// several transitions handled before the dispatcher drains.
const MAX_PENDING_REQUESTS: usize = 4;

// ---------------------------------------------------------------------------
// RegistrationContext
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RegistrationContext {
    requests: heapless::Vec<TransportRequest, MAX_PENDING_REQUESTS>,

    /// Observation notifications may be sent to the server.
    pub notifications_enabled: bool,

    /// Set when `Disconnected` was reached by a completed deregistration,
    /// as opposed to the initial state or a reset after failure.
    pub unregistered_by_request: bool,
}

impl RegistrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, req: TransportRequest) {
        if self.requests.push(req).is_err() {
            warn!("registration: request queue full, dropping {:?}", req);
        }
    }

    /// Drain the requests raised since the last call, oldest first.
    pub fn take_requests(&mut self) -> heapless::Vec<TransportRequest, MAX_PENDING_REQUESTS> {
        core::mem::take(&mut self.requests)
    }

    pub fn pending_requests(&self) -> &[TransportRequest] {
        &self.requests
    }
}
