//! Fuzz target: remote requests through the dispatcher
//!
//! Decodes the input into a stream of transport events (reads, writes,
//! executes, acks, errors) aimed at the standard resources and feeds it to
//! `EventDispatcher::tick`.  Verifies:
//! - No panics for any event ordering or payload
//! - Every remote request gets exactly one response
//! - Unit resources never change
//!
//! cargo fuzz run fuzz_remote_requests

#![no_main]

use std::collections::VecDeque;

use cloudnode::app::dispatcher::EventDispatcher;
use cloudnode::app::events::AppEvent;
use cloudnode::app::ports::{
    DigitalOutput, EventSink, RemoteResponse, SensorPort, Transport, TransportEvent,
};
use cloudnode::config::NodeConfig;
use cloudnode::drivers::button::ButtonLatch;
use cloudnode::error::{CommsError, SensorError};
use cloudnode::resource::ResourcePath;
use libfuzzer_sys::fuzz_target;

const TARGETS: [ResourcePath; 10] = [
    ResourcePath::new(3200, 0, 5501),
    ResourcePath::new(3201, 0, 5853),
    ResourcePath::new(3201, 0, 5850),
    ResourcePath::new(3313, 0, 5702),
    ResourcePath::new(3313, 0, 5703),
    ResourcePath::new(3313, 0, 5704),
    ResourcePath::new(3313, 0, 5701),
    ResourcePath::new(3303, 0, 5700),
    ResourcePath::new(3303, 0, 5701),
    ResourcePath::new(1, 2, 3),
];

struct NullOutput;

impl DigitalOutput for NullOutput {
    fn set(&mut self, _active: bool) {}
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

struct FlakySensors(u8);

impl SensorPort for FlakySensors {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        if self.0 & 1 == 0 {
            Ok(f32::from(self.0))
        } else {
            Err(SensorError::BusError)
        }
    }

    fn read_acceleration(&mut self) -> Result<[f32; 3], SensorError> {
        if self.0 & 2 == 0 {
            Ok([0.0, 0.0, 1.0])
        } else {
            Err(SensorError::NotReady)
        }
    }
}

#[derive(Default)]
struct ScriptedTransport {
    events: VecDeque<TransportEvent>,
    responses: usize,
}

impl Transport for ScriptedTransport {
    fn connect(&mut self) {}
    fn register(&mut self, _resources: &[ResourcePath]) {}
    fn deregister(&mut self) {}
    fn notify(&mut self, _path: &ResourcePath, _value: &str) {}

    fn respond(&mut self, _path: &ResourcePath, _response: RemoteResponse<'_>) {
        self.responses += 1;
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.pop_front()
    }
}

fn decode(chunk: &[u8]) -> TransportEvent {
    let path = TARGETS[usize::from(chunk[1]) % TARGETS.len()];
    let payload = String::from_utf8_lossy(&chunk[2..]).into_owned();
    match chunk[0] % 8 {
        0 => TransportEvent::RemoteRead { path },
        1 => TransportEvent::RemoteWrite { path, value: payload },
        2 => TransportEvent::RemoteExecute { path, arg: payload },
        3 => TransportEvent::Ready,
        4 => TransportEvent::RegistrationAck,
        5 => TransportEvent::Error(CommsError::ConnectFailed),
        6 => TransportEvent::ConnectionLost,
        _ => TransportEvent::Timeout,
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut dispatcher) = EventDispatcher::new(NodeConfig::default(), NullOutput) else {
        return;
    };
    let latch = ButtonLatch::new();
    let mut transport = ScriptedTransport::default();
    let mut sink = NullSink;

    let mut requests = 0;
    for chunk in data.chunks(8).filter(|c| c.len() >= 2) {
        let event = decode(chunk);
        if matches!(
            event,
            TransportEvent::RemoteRead { .. }
                | TransportEvent::RemoteWrite { .. }
                | TransportEvent::RemoteExecute { .. }
        ) {
            requests += 1;
        }
        transport.events.push_back(event);
    }

    let mut now = 0u64;
    let mut sensors = FlakySensors(0);
    while !transport.events.is_empty() {
        now += 100;
        sensors.0 = sensors.0.wrapping_add(1);
        dispatcher.tick(now, &latch, &mut sensors, &mut transport, &mut sink);
    }

    assert_eq!(transport.responses, requests);
    let table = *dispatcher.resources();
    assert_eq!(dispatcher.registry().get_value(table.accel_unit), "G");
    assert_eq!(dispatcher.registry().get_value(table.temperature_unit), "Cel");
});
