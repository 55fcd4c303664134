//! Mock adapters for integration tests.
//!
//! Every mock records the calls it receives so tests can assert on the
//! full interaction history without real GPIO, I²C or network.

use std::collections::VecDeque;

use cloudnode::app::events::AppEvent;
use cloudnode::app::ports::{
    CredentialStore, DigitalOutput, EventSink, RemoteResponse, SensorPort, Transport,
    TransportEvent,
};
use cloudnode::error::{RegistryError, SensorError};
use cloudnode::resource::ResourcePath;

// ── MockOutput ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutput {
    pub writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockOutput {
    pub fn pulses(&self) -> usize {
        self.writes.iter().filter(|w| **w).count()
    }

    pub fn is_active(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }
}

impl DigitalOutput for MockOutput {
    fn set(&mut self, active: bool) {
        self.writes.push(active);
    }
}

// ── MockSensors ───────────────────────────────────────────────

pub struct MockSensors {
    pub temperature: Result<f32, SensorError>,
    pub acceleration: Result<[f32; 3], SensorError>,
    pub reads: u32,
}

impl Default for MockSensors {
    fn default() -> Self {
        Self {
            temperature: Ok(21.5),
            acceleration: Ok([0.0, 0.0, 1.0]),
            reads: 0,
        }
    }
}

impl SensorPort for MockSensors {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        self.temperature
    }

    fn read_acceleration(&mut self) -> Result<[f32; 3], SensorError> {
        self.reads += 1;
        self.acceleration
    }
}

// ── MockTransport ─────────────────────────────────────────────

/// Owned copy of a [`RemoteResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Content(String),
    Changed,
    Accepted,
    Rejected(RegistryError),
}

impl From<RemoteResponse<'_>> for Response {
    fn from(r: RemoteResponse<'_>) -> Self {
        match r {
            RemoteResponse::Content(v) => Self::Content(v.to_owned()),
            RemoteResponse::Changed => Self::Changed,
            RemoteResponse::Accepted => Self::Accepted,
            RemoteResponse::Rejected(e) => Self::Rejected(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Connect,
    Register(Vec<ResourcePath>),
    Deregister,
    Notify(ResourcePath, String),
    Respond(ResourcePath, Response),
}

/// Transport that never answers on its own; tests push events by hand.
#[derive(Default)]
pub struct MockTransport {
    pub calls: Vec<TransportCall>,
    pub events: VecDeque<TransportEvent>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn push(&mut self, event: TransportEvent) {
        self.events.push_back(event);
    }

    pub fn notifications(&self) -> Vec<(ResourcePath, String)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Notify(p, v) => Some((*p, v.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn responses(&self) -> Vec<(ResourcePath, Response)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Respond(p, r) => Some((*p, r.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) {
        self.calls.push(TransportCall::Connect);
    }

    fn register(&mut self, resources: &[ResourcePath]) {
        self.calls.push(TransportCall::Register(resources.to_vec()));
    }

    fn deregister(&mut self) {
        self.calls.push(TransportCall::Deregister);
    }

    fn notify(&mut self, path: &ResourcePath, value: &str) {
        self.calls.push(TransportCall::Notify(*path, value.to_owned()));
    }

    fn respond(&mut self, path: &ResourcePath, response: RemoteResponse<'_>) {
        self.calls.push(TransportCall::Respond(*path, response.into()));
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.pop_front()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockCredentials ───────────────────────────────────────────

pub struct MockCredentials(pub bool);

impl CredentialStore for MockCredentials {
    fn is_ready(&self) -> bool {
        self.0
    }
}
