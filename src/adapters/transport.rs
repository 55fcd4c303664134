//! Loopback transport adapter.
//!
//! Implements [`Transport`] without a network: every request is answered
//! on the next [`poll_event`](Transport::poll_event).  The firmware runs
//! against it until a management-protocol client is wired in behind the
//! same trait, and tests use it to drive the full registration cycle.
//!
//! ## Connection model
//!
//! 1. `connect()` queues `Ready`.
//! 2. `register()` queues `RegistrationAck` (or an error when rejection
//!    is armed).
//! 3. `notify()` queues a `Delivered` report for the path.
//! 4. `deregister()` queues `DeregistrationAck`.
//!
//! Remote requests can be injected with [`SimulatedTransport::inject`].

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::app::ports::{RemoteResponse, Transport, TransportEvent};
use crate::error::CommsError;
use crate::resource::{DeliveryStatus, ResourcePath};

/// Enough for every request a single iteration can raise plus injected
/// remote requests; anything beyond is dropped with a warning.
const MAX_QUEUED_EVENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connected,
    Registered,
}

pub struct SimulatedTransport {
    state: SessionState,
    events: VecDeque<TransportEvent>,
    reject_registration: bool,
    registered_resources: usize,
    notifications_sent: u32,
    responses_sent: u32,
    last_notification: Option<(ResourcePath, String)>,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            events: VecDeque::new(),
            reject_registration: false,
            registered_resources: 0,
            notifications_sent: 0,
            responses_sent: 0,
            last_notification: None,
        }
    }

    /// Answer the next registration with `RegistrationRejected`.
    pub fn reject_registration(&mut self, reject: bool) {
        self.reject_registration = reject;
    }

    /// Queue an event as if the server had sent it.
    pub fn inject(&mut self, event: TransportEvent) {
        self.push(event);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn registered_resources(&self) -> usize {
        self.registered_resources
    }

    pub fn notifications_sent(&self) -> u32 {
        self.notifications_sent
    }

    pub fn responses_sent(&self) -> u32 {
        self.responses_sent
    }

    pub fn last_notification(&self) -> Option<&(ResourcePath, String)> {
        self.last_notification.as_ref()
    }

    fn push(&mut self, event: TransportEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            warn!("sim transport: event queue full, dropping {:?}", event);
            return;
        }
        self.events.push_back(event);
    }
}

impl Transport for SimulatedTransport {
    fn connect(&mut self) {
        info!("sim transport: connected");
        self.state = SessionState::Connected;
        self.push(TransportEvent::Ready);
    }

    fn register(&mut self, resources: &[ResourcePath]) {
        if self.state != SessionState::Connected {
            self.push(TransportEvent::Error(CommsError::ConnectFailed));
            return;
        }
        if self.reject_registration {
            self.reject_registration = false;
            self.push(TransportEvent::Error(CommsError::RegistrationRejected));
            return;
        }
        info!("sim transport: registered {} resources", resources.len());
        self.registered_resources = resources.len();
        self.state = SessionState::Registered;
        self.push(TransportEvent::RegistrationAck);
    }

    fn deregister(&mut self) {
        info!("sim transport: deregistered");
        self.state = SessionState::Idle;
        self.registered_resources = 0;
        self.push(TransportEvent::DeregistrationAck);
    }

    fn notify(&mut self, path: &ResourcePath, value: &str) {
        debug!("sim transport: notify {} = {}", path, value);
        self.notifications_sent = self.notifications_sent.wrapping_add(1);
        self.last_notification = Some((*path, value.to_owned()));
        self.push(TransportEvent::NotifyResult {
            path: *path,
            status: DeliveryStatus::Delivered,
        });
    }

    fn respond(&mut self, path: &ResourcePath, response: RemoteResponse<'_>) {
        debug!("sim transport: respond {} {:?}", path, response);
        self.responses_sent = self.responses_sent.wrapping_add(1);
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.pop_front()
    }
}
