//! EventDispatcher integration tests.
//!
//! Exercises the per-iteration orchestration (button, blink, sensors,
//! remote requests, notifications) against the mocks in `mock_hw`.

use cloudnode::app::commands::AppCommand;
use cloudnode::app::dispatcher::{format_reading, EventDispatcher, LoopControl};
use cloudnode::app::events::AppEvent;
use cloudnode::app::ports::TransportEvent;
use cloudnode::app::resources::{
    BLINK_PATH, BUTTON_PATH, PATTERN_PATH, TEMPERATURE_PATH, TEMPERATURE_UNIT_PATH,
};
use cloudnode::config::NodeConfig;
use cloudnode::drivers::button::ButtonLatch;
use cloudnode::error::{RegistryError, SensorError};
use cloudnode::resource::{DeliveryStatus, ResourcePath};

use crate::mock_hw::{
    MockCredentials, MockOutput, MockSensors, MockTransport, RecordingSink, Response,
};

const STEP_MS: u64 = 100;

fn path(text: &str) -> ResourcePath {
    ResourcePath::parse(text).unwrap()
}

struct Rig {
    dispatcher: EventDispatcher<MockOutput>,
    latch: ButtonLatch,
    sensors: MockSensors,
    transport: MockTransport,
    sink: RecordingSink,
    now_ms: u64,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    fn with_config(config: NodeConfig) -> Self {
        let mut rig = Self {
            dispatcher: EventDispatcher::new(config, MockOutput::default()).unwrap(),
            latch: ButtonLatch::new(),
            sensors: MockSensors::default(),
            transport: MockTransport::default(),
            sink: RecordingSink::default(),
            now_ms: 0,
        };
        rig.dispatcher.start(&mut rig.sink);
        rig
    }

    fn tick(&mut self) -> LoopControl {
        self.now_ms += STEP_MS;
        self.dispatcher.tick(
            self.now_ms,
            &self.latch,
            &mut self.sensors,
            &mut self.transport,
            &mut self.sink,
        )
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    fn register(&mut self) {
        self.dispatcher
            .start_registration(&MockCredentials(true), &mut self.transport, &mut self.sink)
            .unwrap();
        self.transport.push(TransportEvent::Ready);
        self.tick();
        self.transport.push(TransportEvent::RegistrationAck);
        self.tick();
        assert!(self.dispatcher.is_registered());
        self.transport.clear();
    }

    fn command(&mut self, cmd: AppCommand) {
        self.dispatcher
            .handle_command(cmd, self.now_ms, &mut self.transport, &mut self.sink);
    }

    fn value(&self, text: &str) -> String {
        let registry = self.dispatcher.registry();
        let handle = registry.find(&path(text)).unwrap();
        registry.get_value(handle).to_owned()
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_reports_installed_resources() {
    let rig = Rig::new();
    assert_eq!(rig.sink.events[0], AppEvent::Started { resources: 9 });
    assert_eq!(rig.value(PATTERN_PATH), "500:500:500:500");
}

// ── Button ────────────────────────────────────────────────────

#[test]
fn button_press_updates_resource() {
    let mut rig = Rig::new();
    rig.latch.on_edge();
    rig.latch.on_edge();
    rig.tick();

    assert_eq!(rig.value(BUTTON_PATH), "2");
    assert!(rig.sink.events.contains(&AppEvent::ButtonPressed { count: 2 }));

    // Nothing pending: the next iteration leaves the value alone.
    rig.tick();
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ButtonPressed { .. })),
        1
    );
}

#[test]
fn unregistered_node_holds_notifications_until_registered() {
    let mut rig = Rig::new();
    rig.latch.on_edge();
    rig.tick();
    assert!(rig.transport.notifications().is_empty());

    rig.dispatcher
        .start_registration(&MockCredentials(true), &mut rig.transport, &mut rig.sink)
        .unwrap();
    rig.transport.push(TransportEvent::Ready);
    rig.tick();
    assert!(rig.transport.notifications().is_empty());

    rig.transport.push(TransportEvent::RegistrationAck);
    rig.tick();
    assert_eq!(
        rig.transport.notifications(),
        vec![(path(BUTTON_PATH), "1".to_owned())]
    );
}

#[test]
fn repeated_updates_coalesce_into_one_notification() {
    let mut rig = Rig::new();
    rig.register();

    let temperature = rig.dispatcher.resources().temperature;
    rig.dispatcher.registry_mut().set_value(temperature, "20.0");
    rig.dispatcher.registry_mut().set_value(temperature, "20.5");
    rig.tick();

    assert_eq!(
        rig.transport.notifications(),
        vec![(path(TEMPERATURE_PATH), "20.5".to_owned())]
    );
}

// ── Sensors ───────────────────────────────────────────────────

fn fast_sensor_config() -> NodeConfig {
    NodeConfig {
        sensor_interval_ms: 1000,
        ..NodeConfig::default()
    }
}

#[test]
fn sensor_timer_samples_every_interval() {
    let mut rig = Rig::with_config(fast_sensor_config());

    // First tick arms the timer, the next sample is one interval later.
    rig.ticks(10);
    assert_eq!(rig.sensors.reads, 0);
    rig.tick();
    assert_eq!(rig.sensors.reads, 2);

    assert_eq!(rig.value(TEMPERATURE_PATH), format_reading(21.5));
    assert_eq!(rig.value("3313/0/5704"), "1.000000");
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::SampleUpdated(_))),
        2
    );
}

#[test]
fn failed_read_keeps_previous_value() {
    let mut rig = Rig::with_config(fast_sensor_config());
    rig.ticks(11);
    assert_eq!(rig.value(TEMPERATURE_PATH), "21.500000");

    rig.sensors.temperature = Err(SensorError::BusError);
    rig.sensors.acceleration = Ok([0.5, -0.5, 1.0]);
    rig.ticks(10);

    assert_eq!(rig.value(TEMPERATURE_PATH), "21.500000");
    assert_eq!(rig.value("3313/0/5702"), "0.500000");
    assert_eq!(rig.value("3313/0/5703"), "-0.500000");
    assert!(rig.sink.events.contains(&AppEvent::SensorReadFailed {
        sensor: "temperature"
    }));
}

#[test]
fn failed_acceleration_read_keeps_all_axes() {
    let mut rig = Rig::with_config(fast_sensor_config());
    rig.sensors.acceleration = Ok([0.25, -1.5, 0.75]);
    rig.ticks(11);
    let before: Vec<String> = ["3313/0/5702", "3313/0/5703", "3313/0/5704"]
        .iter()
        .map(|p| rig.value(p))
        .collect();
    assert_eq!(before, ["0.250000", "-1.500000", "0.750000"]);

    rig.sensors.acceleration = Err(SensorError::NotReady);
    rig.sensors.temperature = Ok(22.0);
    rig.ticks(10);

    let after: Vec<String> = ["3313/0/5702", "3313/0/5703", "3313/0/5704"]
        .iter()
        .map(|p| rig.value(p))
        .collect();
    assert_eq!(after, before);
    assert_eq!(rig.value(TEMPERATURE_PATH), "22.000000");
    assert!(rig.sink.events.contains(&AppEvent::SensorReadFailed {
        sensor: "acceleration"
    }));
}

// ── Iteration order ───────────────────────────────────────────

#[test]
fn one_iteration_runs_button_then_blink_then_sensors() {
    let mut rig = Rig::with_config(fast_sensor_config());
    rig.ticks(9);

    // One duration: first pulse on the next tick, closing pulse on the
    // tick after, which is also when the sensor interval elapses.
    rig.command(AppCommand::StartBlink {
        pattern: Some("100".to_owned()),
    });
    rig.tick();
    rig.latch.on_edge();
    let mark = rig.sink.events.len();
    rig.tick();

    let events = &rig.sink.events[mark..];
    let position = |pred: fn(&AppEvent) -> bool| events.iter().position(pred).unwrap();
    let button = position(|e| matches!(e, AppEvent::ButtonPressed { .. }));
    let blink = position(|e| *e == AppEvent::BlinkFinished);
    let sample = position(|e| matches!(e, AppEvent::SampleUpdated(_)));
    assert!(button < blink, "{events:?}");
    assert!(blink < sample, "{events:?}");
}

// ── Remote requests ───────────────────────────────────────────

#[test]
fn remote_read_returns_current_value() {
    let mut rig = Rig::new();
    rig.register();
    rig.transport.push(TransportEvent::RemoteRead {
        path: path(TEMPERATURE_UNIT_PATH),
    });
    rig.tick();

    assert_eq!(
        rig.transport.responses(),
        vec![(path(TEMPERATURE_UNIT_PATH), Response::Content("Cel".to_owned()))]
    );
}

#[test]
fn remote_write_to_read_only_resource_is_rejected() {
    let mut rig = Rig::new();
    rig.register();
    rig.transport.push(TransportEvent::RemoteWrite {
        path: path(BUTTON_PATH),
        value: "42".to_owned(),
    });
    rig.tick();

    assert_eq!(
        rig.transport.responses(),
        vec![(
            path(BUTTON_PATH),
            Response::Rejected(RegistryError::MethodNotAllowed)
        )]
    );
    assert_eq!(rig.value(BUTTON_PATH), "0");
    assert!(rig.sink.events.contains(&AppEvent::RemoteRejected {
        path: path(BUTTON_PATH),
        error: RegistryError::MethodNotAllowed,
    }));
}

#[test]
fn unknown_path_is_rejected() {
    let mut rig = Rig::new();
    rig.register();
    let missing = ResourcePath::new(9999, 0, 1);
    rig.transport.push(TransportEvent::RemoteRead { path: missing });
    rig.tick();

    assert_eq!(
        rig.transport.responses(),
        vec![(missing, Response::Rejected(RegistryError::UnknownResource))]
    );
}

#[test]
fn written_pattern_drives_the_blink_sequence() {
    let mut rig = Rig::new();
    rig.register();

    rig.transport.push(TransportEvent::RemoteWrite {
        path: path(PATTERN_PATH),
        value: "100:100".to_owned(),
    });
    rig.transport.push(TransportEvent::RemoteExecute {
        path: path(BLINK_PATH),
        arg: String::new(),
    });
    rig.tick();

    assert_eq!(
        rig.transport.responses(),
        vec![
            (path(PATTERN_PATH), Response::Changed),
            (path(BLINK_PATH), Response::Accepted),
        ]
    );
    assert!(rig.sink.events.contains(&AppEvent::BlinkStarted { steps: 2 }));
    assert!(rig.dispatcher.sequencer().is_running());

    rig.ticks(5);
    assert!(!rig.dispatcher.sequencer().is_running());
    assert_eq!(rig.sink.count(|e| *e == AppEvent::BlinkFinished), 1);
    // Two durations bound three pulses, and the last one is released.
    assert_eq!(rig.dispatcher.sequencer().output().pulses(), 3);
    assert!(!rig.dispatcher.sequencer().output().is_active());
}

#[test]
fn execute_argument_overrides_stored_pattern() {
    let mut rig = Rig::new();
    rig.transport.push(TransportEvent::RemoteExecute {
        path: path(BLINK_PATH),
        arg: "50".to_owned(),
    });
    rig.tick();

    assert!(rig.sink.events.contains(&AppEvent::BlinkStarted { steps: 1 }));
    assert_eq!(rig.value(PATTERN_PATH), "500:500:500:500");
}

#[test]
fn empty_pattern_finishes_immediately() {
    let mut rig = Rig::new();
    rig.command(AppCommand::StartBlink {
        pattern: Some(String::new()),
    });

    let n = rig.sink.events.len();
    assert_eq!(
        rig.sink.events[n - 2..],
        [AppEvent::BlinkStarted { steps: 0 }, AppEvent::BlinkFinished]
    );
    rig.ticks(3);
    assert_eq!(rig.dispatcher.sequencer().output().pulses(), 0);
}

#[test]
fn stop_blink_releases_output() {
    let mut rig = Rig::new();
    rig.command(AppCommand::StartBlink {
        pattern: Some("1000:1000".to_owned()),
    });
    rig.tick();
    assert!(rig.dispatcher.sequencer().output().is_active());

    rig.command(AppCommand::StopBlink);
    assert!(!rig.dispatcher.sequencer().is_running());
    assert!(!rig.dispatcher.sequencer().output().is_active());
}

// ── Transport plumbing ────────────────────────────────────────

#[test]
fn delivery_results_are_forwarded() {
    let mut rig = Rig::new();
    rig.register();
    rig.transport.push(TransportEvent::NotifyResult {
        path: path(BUTTON_PATH),
        status: DeliveryStatus::Delivered,
    });
    rig.tick();

    assert!(rig.sink.events.contains(&AppEvent::NotifyResult {
        path: path(BUTTON_PATH),
        status: DeliveryStatus::Delivered,
    }));
}

#[test]
fn transport_events_per_tick_are_bounded() {
    let config = NodeConfig {
        max_transport_events_per_tick: 2,
        ..NodeConfig::default()
    };
    let mut rig = Rig::with_config(config);
    rig.register();

    for _ in 0..5 {
        rig.transport.push(TransportEvent::RemoteRead {
            path: path(TEMPERATURE_UNIT_PATH),
        });
    }
    rig.tick();
    assert_eq!(rig.transport.responses().len(), 2);
    assert_eq!(rig.transport.events.len(), 3);

    rig.ticks(2);
    assert_eq!(rig.transport.responses().len(), 5);
}

#[test]
fn iterations_are_counted() {
    let mut rig = Rig::new();
    rig.ticks(7);
    assert_eq!(rig.dispatcher.iterations(), 7);
}
