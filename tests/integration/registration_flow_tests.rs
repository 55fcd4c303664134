//! Registration lifecycle tests.
//!
//! Drives the dispatcher through connect → register → deregister, plus
//! the failure and reset paths, first against `MockTransport` and then
//! end-to-end against the loopback transport.

use cloudnode::adapters::transport::SimulatedTransport;
use cloudnode::app::commands::AppCommand;
use cloudnode::app::dispatcher::{EventDispatcher, LoopControl};
use cloudnode::app::events::AppEvent;
use cloudnode::app::ports::{Transport, TransportEvent};
use cloudnode::app::resources::{BUTTON_PATH, TEMPERATURE_PATH};
use cloudnode::config::NodeConfig;
use cloudnode::drivers::button::ButtonLatch;
use cloudnode::error::{CommsError, Error};
use cloudnode::fsm::RegistrationState;
use cloudnode::resource::{DeliveryStatus, ResourcePath};

use crate::mock_hw::{
    MockCredentials, MockOutput, MockSensors, MockTransport, RecordingSink, TransportCall,
};

use RegistrationState::*;

fn dispatcher() -> EventDispatcher<MockOutput> {
    EventDispatcher::new(NodeConfig::default(), MockOutput::default()).unwrap()
}

fn tick(
    d: &mut EventDispatcher<MockOutput>,
    now_ms: u64,
    transport: &mut impl Transport,
    sink: &mut RecordingSink,
) -> LoopControl {
    let latch = ButtonLatch::new();
    d.tick(now_ms, &latch, &mut MockSensors::default(), transport, sink)
}

fn transitions(sink: &RecordingSink) -> Vec<(RegistrationState, RegistrationState)> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::RegistrationChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn full_registration_cycle() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    assert_eq!(d.registration_state(), Connecting);
    assert_eq!(t.calls, vec![TransportCall::Connect]);

    t.push(TransportEvent::Ready);
    tick(&mut d, 100, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Registering);
    let TransportCall::Register(paths) = &t.calls[1] else {
        panic!("expected register, got {:?}", t.calls[1]);
    };
    assert_eq!(paths.len(), 9);
    assert!(paths.contains(&ResourcePath::parse(TEMPERATURE_PATH).unwrap()));

    t.push(TransportEvent::RegistrationAck);
    tick(&mut d, 200, &mut t, &mut sink);
    assert!(d.is_registered());
    assert_eq!(
        transitions(&sink),
        vec![
            (Disconnected, Connecting),
            (Connecting, Registering),
            (Registering, Registered),
        ]
    );
}

#[test]
fn registration_waits_for_credentials() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    let err = d
        .start_registration(&MockCredentials(false), &mut t, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Init(_)));
    assert_eq!(d.registration_state(), Disconnected);
    assert!(t.calls.is_empty());
    assert!(transitions(&sink).is_empty());
}

#[test]
fn requested_deregistration_exits_the_loop() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    t.push(TransportEvent::Ready);
    tick(&mut d, 100, &mut t, &mut sink);
    t.push(TransportEvent::RegistrationAck);
    tick(&mut d, 200, &mut t, &mut sink);

    d.handle_command(AppCommand::Unregister, 200, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Unregistering);
    assert_eq!(t.calls.last(), Some(&TransportCall::Deregister));

    // Still waiting for the ack.
    assert_eq!(tick(&mut d, 300, &mut t, &mut sink), LoopControl::Continue);

    t.push(TransportEvent::DeregistrationAck);
    assert_eq!(tick(&mut d, 400, &mut t, &mut sink), LoopControl::Exit);
    assert_eq!(d.registration_state(), Disconnected);
}

#[test]
fn rejected_registration_fails_until_reset() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    t.push(TransportEvent::Ready);
    t.push(TransportEvent::Error(CommsError::RegistrationRejected));
    assert_eq!(tick(&mut d, 100, &mut t, &mut sink), LoopControl::Continue);
    assert_eq!(d.registration_state(), Failed);

    // Start is ignored while failed.
    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    assert_eq!(d.registration_state(), Failed);

    d.handle_command(AppCommand::ResetRegistration, 100, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Disconnected);

    t.clear();
    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    assert_eq!(t.calls, vec![TransportCall::Connect]);
}

#[test]
fn restart_after_reset_still_needs_credentials() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    t.push(TransportEvent::Timeout);
    tick(&mut d, 100, &mut t, &mut sink);
    d.handle_command(AppCommand::ResetRegistration, 100, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Disconnected);

    t.clear();
    assert!(
        d.start_registration(&MockCredentials(false), &mut t, &mut sink)
            .is_err()
    );
    tick(&mut d, 200, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Disconnected);
    assert!(t.calls.is_empty());
}

fn registered() -> (EventDispatcher<MockOutput>, MockTransport, RecordingSink) {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();
    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    t.push(TransportEvent::Ready);
    tick(&mut d, 100, &mut t, &mut sink);
    t.push(TransportEvent::RegistrationAck);
    tick(&mut d, 200, &mut t, &mut sink);
    assert!(d.is_registered());
    t.clear();
    (d, t, sink)
}

#[test]
fn connection_lost_error_leaves_registered() {
    let (mut d, mut t, mut sink) = registered();

    t.push(TransportEvent::Error(CommsError::ConnectionLost));
    tick(&mut d, 300, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Failed);

    let button = d.resources().button;
    d.registry_mut().set_value(button, "3");
    tick(&mut d, 400, &mut t, &mut sink);
    assert!(t.notifications().is_empty());
}

#[test]
fn timeout_error_fails_registration() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    t.push(TransportEvent::Ready);
    t.push(TransportEvent::Error(CommsError::Timeout));
    tick(&mut d, 100, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Failed);
}

#[test]
fn loopback_connection_lost_error_fails() {
    let mut d = dispatcher();
    let mut t = SimulatedTransport::new();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    tick(&mut d, 100, &mut t, &mut sink);
    assert!(d.is_registered());

    t.inject(TransportEvent::Error(CommsError::ConnectionLost));
    tick(&mut d, 200, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Failed);
}

#[test]
fn connect_timeout_fails() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    t.push(TransportEvent::Timeout);
    tick(&mut d, 100, &mut t, &mut sink);
    assert_eq!(d.registration_state(), Failed);
}

#[test]
fn lost_connection_stops_notifications() {
    let mut d = dispatcher();
    let mut t = MockTransport::default();
    let mut sink = RecordingSink::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();
    t.push(TransportEvent::Ready);
    tick(&mut d, 100, &mut t, &mut sink);
    t.push(TransportEvent::RegistrationAck);
    tick(&mut d, 200, &mut t, &mut sink);
    t.clear();

    t.push(TransportEvent::ConnectionLost);
    assert_eq!(tick(&mut d, 300, &mut t, &mut sink), LoopControl::Continue);
    assert_eq!(d.registration_state(), Failed);

    let button = d.resources().button;
    d.registry_mut().set_value(button, "5");
    tick(&mut d, 400, &mut t, &mut sink);
    assert!(t.notifications().is_empty());
    assert_eq!(d.registry().pending_notifications(), 1);
}

#[test]
fn loopback_transport_runs_the_whole_lifecycle() {
    let mut d = dispatcher();
    let mut t = SimulatedTransport::new();
    let mut sink = RecordingSink::default();
    let latch = ButtonLatch::new();
    let mut sensors = MockSensors::default();

    d.start_registration(&MockCredentials(true), &mut t, &mut sink)
        .unwrap();

    let mut now_ms = 0;
    while !d.is_registered() && now_ms < 1_000 {
        now_ms += 100;
        d.tick(now_ms, &latch, &mut sensors, &mut t, &mut sink);
    }
    assert!(d.is_registered());
    assert_eq!(t.registered_resources(), 9);

    latch.on_edge();
    now_ms += 100;
    d.tick(now_ms, &latch, &mut sensors, &mut t, &mut sink);
    assert_eq!(
        t.last_notification(),
        Some(&(ResourcePath::parse(BUTTON_PATH).unwrap(), "1".to_owned()))
    );

    // Delivery report comes back on the next iteration.
    now_ms += 100;
    d.tick(now_ms, &latch, &mut sensors, &mut t, &mut sink);
    assert!(sink.events.contains(&AppEvent::NotifyResult {
        path: ResourcePath::parse(BUTTON_PATH).unwrap(),
        status: DeliveryStatus::Delivered,
    }));

    d.handle_command(AppCommand::Unregister, now_ms, &mut t, &mut sink);
    now_ms += 100;
    assert_eq!(
        d.tick(now_ms, &latch, &mut sensors, &mut t, &mut sink),
        LoopControl::Exit
    );
}
