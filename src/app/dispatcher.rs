//! Event dispatcher: the hexagonal core.
//!
//! [`EventDispatcher`] owns the resource registry, the blink sequencer and
//! the registration machine.  Every collaborator that does I/O (button
//! latch, sensors, transport, event sink) is injected per call, so the
//! whole loop runs against mocks in tests.
//!
//! ```text
//!  ButtonLatch ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   SensorPort ──▶ │        EventDispatcher       │
//!                  │ Registry · Blink · Register  │ ◀─▶ Transport
//!                  └──────────────────────────────┘
//! ```
//!
//! ## Iteration order
//!
//! 1. Button latch → button resource.
//! 2. Blink sequencer tick.
//! 3. Sensor sampling, when the sensor interval has elapsed.
//! 4. Up to `max_transport_events_per_tick` transport events: registration
//!    steps and remote requests.
//! 5. While registered, flush queued notifications.
//!
//! Nothing in here blocks.  Each step is bounded by a fixed count.

use log::{info, warn};

use crate::config::NodeConfig;
use crate::drivers::blink::BlinkSequencer;
use crate::drivers::button::ButtonLatch;
use crate::error::{CommsError, Error, RegistryError, Result};
use crate::fsm::{
    RegistrationContext, RegistrationEvent, RegistrationMachine, RegistrationState,
    TransportRequest,
};
use crate::resource::{ResourcePath, ResourceRegistry, MAX_RESOURCES};
use crate::scheduler::IntervalTimer;
use crate::sensors::{Reading, SensorSample};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    CredentialStore, DigitalOutput, EventSink, RemoteResponse, SensorPort, Transport,
    TransportEvent,
};
use super::resources::{self, ResourceTable};

/// What the caller should do after an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    /// Deregistration completed; leave the control loop.
    Exit,
}

/// Render a reading the way the resources store it (six decimals).
pub fn format_reading(value: f32) -> String {
    format!("{value:.6}")
}

// ───────────────────────────────────────────────────────────────
// EventDispatcher
// ───────────────────────────────────────────────────────────────

pub struct EventDispatcher<O: DigitalOutput> {
    registry: ResourceRegistry,
    table: ResourceTable,
    sequencer: BlinkSequencer<O>,
    registration: RegistrationMachine,
    reg_ctx: RegistrationContext,
    sensor_timer: IntervalTimer,
    config: NodeConfig,
    iterations: u64,
}

impl<O: DigitalOutput> EventDispatcher<O> {
    /// Build the dispatcher and install the standard resources.
    ///
    /// `output` is the blink LED; the sequencer owns it from here on.
    pub fn new(config: NodeConfig, output: O) -> Result<Self> {
        let mut registry = ResourceRegistry::new();
        let table = resources::install(&mut registry, &config)?;
        let sequencer = BlinkSequencer::new(output, config.pulse_width_ms);
        let sensor_timer = IntervalTimer::new("sensors", config.sensor_interval_ms);

        Ok(Self {
            registry,
            table,
            sequencer,
            registration: RegistrationMachine::default(),
            reg_ctx: RegistrationContext::new(),
            sensor_timer,
            config,
            iterations: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            resources: self.registry.len(),
        });
        info!("dispatcher started with {} resources", self.registry.len());
    }

    /// Begin registration, provided the credential store is ready.
    pub fn start_registration(
        &mut self,
        store: &impl CredentialStore,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if !store.is_ready() {
            warn!("credential store not ready, registration not started");
            return Err(Error::Init("credential store not ready"));
        }
        self.step_registration(RegistrationEvent::Start, transport, sink);
        Ok(())
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one control-loop iteration.
    pub fn tick(
        &mut self,
        now_ms: u64,
        button: &ButtonLatch,
        sensors: &mut impl SensorPort,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) -> LoopControl {
        self.iterations += 1;

        // 1. Button
        if let Some(count) = button.take() {
            self.registry
                .set_value(self.table.button, &count.to_string());
            sink.emit(&AppEvent::ButtonPressed { count });
        }

        // 2. Blink
        if self.sequencer.tick(now_ms) {
            sink.emit(&AppEvent::BlinkFinished);
        }

        // 3. Sensors
        if self.sensor_timer.poll(now_ms) {
            self.sample_sensors(now_ms, sensors, sink);
        }

        // 4. Transport events
        let mut control = LoopControl::Continue;
        for _ in 0..self.config.max_transport_events_per_tick {
            let Some(event) = transport.poll_event() else {
                break;
            };
            if self.handle_transport_event(event, now_ms, transport, sink) == LoopControl::Exit {
                control = LoopControl::Exit;
                break;
            }
        }

        // 5. Notifications
        if self.reg_ctx.notifications_enabled {
            self.flush_notifications(transport);
        }

        control
    }

    /// Apply a command from a resource handler or the surrounding
    /// application.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::StartBlink { pattern } => {
                let text = match pattern {
                    Some(p) => p,
                    None => self.registry.get_value(self.table.pattern).to_owned(),
                };
                let steps = self.sequencer.start(&text, now_ms);
                sink.emit(&AppEvent::BlinkStarted { steps });
                if steps == 0 {
                    sink.emit(&AppEvent::BlinkFinished);
                }
            }
            AppCommand::StopBlink => self.sequencer.stop(),
            AppCommand::Unregister => {
                self.step_registration(RegistrationEvent::Unregister, transport, sink);
            }
            AppCommand::ResetRegistration => {
                self.step_registration(RegistrationEvent::Reset, transport, sink);
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Direct registry access for application-specific resources.
    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.table
    }

    pub fn sequencer(&self) -> &BlinkSequencer<O> {
        &self.sequencer
    }

    pub fn registration_state(&self) -> RegistrationState {
        self.registration.current_state()
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_registered()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    // ── Internal ──────────────────────────────────────────────

    fn sample_sensors(
        &mut self,
        now_ms: u64,
        sensors: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) {
        match sensors.read_temperature() {
            Ok(celsius) => {
                self.registry
                    .set_value(self.table.temperature, &format_reading(celsius));
                sink.emit(&AppEvent::SampleUpdated(SensorSample::new(
                    now_ms,
                    Reading::Temperature(celsius),
                )));
            }
            Err(e) => {
                warn!("temperature read failed: {}", e);
                sink.emit(&AppEvent::SensorReadFailed {
                    sensor: "temperature",
                });
            }
        }

        match sensors.read_acceleration() {
            Ok(axes) => {
                for (handle, value) in self.table.accel.into_iter().zip(axes) {
                    self.registry.set_value(handle, &format_reading(value));
                }
                sink.emit(&AppEvent::SampleUpdated(SensorSample::new(
                    now_ms,
                    Reading::Acceleration(axes),
                )));
            }
            Err(e) => {
                warn!("acceleration read failed: {}", e);
                sink.emit(&AppEvent::SensorReadFailed {
                    sensor: "acceleration",
                });
            }
        }
    }

    fn handle_transport_event(
        &mut self,
        event: TransportEvent,
        now_ms: u64,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) -> LoopControl {
        let reg_event = match event {
            TransportEvent::Ready => RegistrationEvent::TransportReady,
            TransportEvent::Error(e) => {
                warn!("transport error: {}", e);
                match e {
                    CommsError::ConnectionLost => RegistrationEvent::TransportLost,
                    CommsError::Timeout => RegistrationEvent::Timeout,
                    CommsError::ConnectFailed | CommsError::RegistrationRejected => {
                        RegistrationEvent::TransportError
                    }
                }
            }
            TransportEvent::Timeout => RegistrationEvent::Timeout,
            TransportEvent::RegistrationAck | TransportEvent::DeregistrationAck => {
                RegistrationEvent::AckReceived
            }
            TransportEvent::ConnectionLost => RegistrationEvent::TransportLost,
            TransportEvent::RemoteRead { path } => {
                self.remote_read(&path, transport, sink);
                return LoopControl::Continue;
            }
            TransportEvent::RemoteWrite { path, value } => {
                self.remote_write(&path, &value, now_ms, transport, sink);
                return LoopControl::Continue;
            }
            TransportEvent::RemoteExecute { path, arg } => {
                self.remote_execute(&path, &arg, now_ms, transport, sink);
                return LoopControl::Continue;
            }
            TransportEvent::NotifyResult { path, status } => {
                if let Err(e) = self.registry.report_delivery(&path, status) {
                    warn!("delivery report for {}: {}", path, e);
                }
                sink.emit(&AppEvent::NotifyResult { path, status });
                return LoopControl::Continue;
            }
        };

        match self.step_registration(reg_event, transport, sink) {
            Some((RegistrationState::Unregistering, RegistrationState::Disconnected))
                if self.reg_ctx.unregistered_by_request =>
            {
                info!("deregistered on request, leaving control loop");
                LoopControl::Exit
            }
            _ => LoopControl::Continue,
        }
    }

    fn remote_read(
        &mut self,
        path: &ResourcePath,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) {
        let result = self
            .registry
            .find(path)
            .ok_or(RegistryError::UnknownResource)
            .and_then(|h| self.registry.handle_remote_read(h));
        match result {
            Ok(value) => transport.respond(path, RemoteResponse::Content(value)),
            Err(error) => self.reject(path, error, transport, sink),
        }
    }

    fn remote_write(
        &mut self,
        path: &ResourcePath,
        value: &str,
        now_ms: u64,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) {
        let result = match self.registry.find(path) {
            Some(h) => self.registry.handle_remote_write(h, value),
            None => Err(RegistryError::UnknownResource),
        };
        match result {
            Ok(cmd) => {
                transport.respond(path, RemoteResponse::Changed);
                if let Some(cmd) = cmd {
                    self.handle_command(cmd, now_ms, transport, sink);
                }
            }
            Err(error) => self.reject(path, error, transport, sink),
        }
    }

    fn remote_execute(
        &mut self,
        path: &ResourcePath,
        arg: &str,
        now_ms: u64,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) {
        let result = match self.registry.find(path) {
            Some(h) => self.registry.handle_remote_execute(h, arg),
            None => Err(RegistryError::UnknownResource),
        };
        match result {
            Ok(cmd) => {
                transport.respond(path, RemoteResponse::Accepted);
                if let Some(cmd) = cmd {
                    self.handle_command(cmd, now_ms, transport, sink);
                }
            }
            Err(error) => self.reject(path, error, transport, sink),
        }
    }

    fn reject(
        &self,
        path: &ResourcePath,
        error: RegistryError,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) {
        warn!("remote request on {} rejected: {}", path, error);
        transport.respond(path, RemoteResponse::Rejected(error));
        sink.emit(&AppEvent::RemoteRejected { path: *path, error });
    }

    /// Feed one event to the registration machine, report the transition
    /// and carry out whatever the entered state asked for.
    fn step_registration(
        &mut self,
        event: RegistrationEvent,
        transport: &mut impl Transport,
        sink: &mut impl EventSink,
    ) -> Option<(RegistrationState, RegistrationState)> {
        let transition = self.registration.handle(event, &mut self.reg_ctx);
        if let Some((from, to)) = transition {
            sink.emit(&AppEvent::RegistrationChanged { from, to });
        }

        for req in self.reg_ctx.take_requests() {
            match req {
                TransportRequest::Connect => transport.connect(),
                TransportRequest::Register => {
                    let paths: heapless::Vec<ResourcePath, MAX_RESOURCES> =
                        self.registry.paths().collect();
                    transport.register(&paths);
                }
                TransportRequest::Deregister => transport.deregister(),
            }
        }
        transition
    }

    fn flush_notifications(&mut self, transport: &mut impl Transport) {
        while let Some(handle) = self.registry.take_notification() {
            if let Some(path) = self.registry.path(handle) {
                transport.notify(&path, self.registry.get_value(handle));
            }
        }
    }
}
