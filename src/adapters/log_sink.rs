//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (the ESP-IDF logger in production, UART / USB-CDC).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::sensors::Reading;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { resources } => {
                info!("START | resources={}", resources);
            }
            AppEvent::RegistrationChanged { from, to } => {
                info!("REG   | {:?} -> {:?}", from, to);
            }
            AppEvent::ButtonPressed { count } => {
                info!("BTN   | count={}", count);
            }
            AppEvent::BlinkStarted { steps } => {
                info!("BLINK | started, steps={}", steps);
            }
            AppEvent::BlinkFinished => {
                info!("BLINK | finished");
            }
            AppEvent::SampleUpdated(sample) => match sample.reading {
                Reading::Temperature(c) => {
                    info!("SENSE | t={}ms temperature={:.2}\u{00b0}C", sample.timestamp_ms, c);
                }
                Reading::Acceleration([x, y, z]) => {
                    info!(
                        "SENSE | t={}ms accel=({:.3}, {:.3}, {:.3})g",
                        sample.timestamp_ms, x, y, z
                    );
                }
            },
            AppEvent::SensorReadFailed { sensor } => {
                warn!("SENSE | {} read failed, value kept", sensor);
            }
            AppEvent::NotifyResult { path, status } => {
                info!("NOTIF | {} {:?}", path, status);
            }
            AppEvent::RemoteRejected { path, error } => {
                warn!("REMOTE| {} rejected: {}", path, error);
            }
        }
    }
}
