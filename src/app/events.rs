//! Outbound application events.
//!
//! The [`EventDispatcher`](super::dispatcher::EventDispatcher) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: log to serial, forward to a
//! console, count them in a test.

use crate::error::RegistryError;
use crate::fsm::RegistrationState;
use crate::resource::{DeliveryStatus, ResourcePath};
use crate::sensors::SensorSample;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The dispatcher has started; carries the resource count.
    Started { resources: usize },

    /// The registration machine changed state.
    RegistrationChanged {
        from: RegistrationState,
        to: RegistrationState,
    },

    /// The button was pressed; `count` is the total edge count so far.
    ButtonPressed { count: u32 },

    /// A blink sequence started with this many durations.
    BlinkStarted { steps: usize },

    /// The running blink sequence emitted its closing pulse.
    BlinkFinished,

    /// A sensor reading was committed to the registry.
    SampleUpdated(SensorSample),

    /// A sensor read failed; the resource keeps its previous value.
    SensorReadFailed { sensor: &'static str },

    /// The transport reported the delivery outcome of a notification.
    NotifyResult {
        path: ResourcePath,
        status: DeliveryStatus,
    },

    /// A remote request was refused.
    RemoteRejected {
        path: ResourcePath,
        error: RegistryError,
    },
}
