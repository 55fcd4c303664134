//! Non-blocking blink sequencer.
//!
//! Turns a pattern such as `500:200:500` into LED pulses spread over time.
//! The main loop calls `tick()` once per iteration; nothing here sleeps.
//!
//! ```text
//!  pattern "500:200"      pulse      wait 500      pulse    wait 200    pulse
//!                        ─┐ ┌──────────────────────┐ ┌─────────────────┐ ┌────
//!  output (active high)   └─┘                      └─┘                 └─┘
//!                         ▲ deadline               ▲ deadline          ▲ Done
//! ```
//!
//! A pattern of N durations produces N + 1 pulses: one before each wait and
//! a closing pulse.  Each pulse is two sub-events (assert, then release
//! `pulse_width_ms` later), both driven from `tick()`.
//!
//! ## States
//!
//! | State                         | Meaning                               |
//! |-------------------------------|---------------------------------------|
//! | `Idle`                        | nothing started yet, or stopped       |
//! | `Running { index, deadline }` | next pulse due at `deadline`          |
//! | `Done`                        | last pulse emitted                    |
//!
//! `start()` while running replaces the sequence outright; the output is a
//! single device, so there is nothing to queue behind.

use log::{debug, info};

use crate::app::ports::DigitalOutput;

/// Ordered millisecond durations parsed from `"a:b:c"` text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlinkPattern(Vec<u32>);

impl BlinkPattern {
    /// Parse colon-separated decimal milliseconds.
    ///
    /// Never fails: an empty, non-numeric, negative or overflowing segment
    /// becomes `0` so the sequence still makes progress.  Blank text is the
    /// empty pattern.
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self(Vec::new());
        }
        Self(
            text.split(':')
                .map(|seg| seg.trim().parse::<u32>().unwrap_or(0))
                .collect(),
        )
    }

    pub fn durations(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running { index: usize, deadline_ms: u64 },
    Done,
}

/// Owns the pulse output exclusively while a sequence runs.
pub struct BlinkSequencer<O: DigitalOutput> {
    output: O,
    pattern: BlinkPattern,
    state: SequencerState,
    pulse_width_ms: u32,
    /// Release time of the pulse currently asserted.
    release_at_ms: Option<u64>,
    pulses: u32,
}

impl<O: DigitalOutput> BlinkSequencer<O> {
    pub fn new(mut output: O, pulse_width_ms: u32) -> Self {
        output.set(false);
        Self {
            output,
            pattern: BlinkPattern::default(),
            state: SequencerState::Idle,
            pulse_width_ms,
            release_at_ms: None,
            pulses: 0,
        }
    }

    /// Parse `pattern` and start it, replacing any running sequence.
    /// Returns the number of durations parsed.
    pub fn start(&mut self, pattern: &str, now_ms: u64) -> usize {
        self.start_pattern(BlinkPattern::parse(pattern), now_ms)
    }

    pub fn start_pattern(&mut self, pattern: BlinkPattern, now_ms: u64) -> usize {
        if matches!(self.state, SequencerState::Running { .. }) {
            debug!("blink: replacing running sequence after {} pulses", self.pulses);
        }
        self.release_now();
        self.pulses = 0;
        self.pattern = pattern;

        let steps = self.pattern.len();
        self.state = if steps == 0 {
            SequencerState::Done
        } else {
            SequencerState::Running {
                index: 0,
                deadline_ms: now_ms,
            }
        };
        info!("blink: started pattern {:?}", self.pattern.durations());
        steps
    }

    /// Cancel the running sequence and turn the output off.
    pub fn stop(&mut self) {
        self.release_now();
        self.state = SequencerState::Idle;
    }

    /// Advance by at most one pulse.  Returns `true` on the tick the
    /// closing pulse is emitted (the sequence is then `Done`).
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if let Some(release) = self.release_at_ms {
            if now_ms >= release {
                self.output.set(false);
                self.release_at_ms = None;
            }
        }

        let SequencerState::Running { index, deadline_ms } = self.state else {
            return false;
        };
        // A pulse still held high defers the next one, so two pulses
        // never merge into one long flash.
        if now_ms < deadline_ms || self.release_at_ms.is_some() {
            return false;
        }

        self.output.set(true);
        self.release_at_ms = Some(now_ms + u64::from(self.pulse_width_ms));
        self.pulses += 1;

        match self.pattern.durations().get(index) {
            Some(&wait_ms) => {
                self.state = SequencerState::Running {
                    index: index + 1,
                    deadline_ms: now_ms + u64::from(wait_ms),
                };
                false
            }
            None => {
                self.state = SequencerState::Done;
                info!("blink: pattern finished ({} pulses)", self.pulses);
                true
            }
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SequencerState::Running { .. })
    }

    /// Pulses emitted by the current (or last) sequence.
    pub fn pulses_emitted(&self) -> u32 {
        self.pulses
    }

    /// Whether a pulse is currently asserted.
    pub fn output_active(&self) -> bool {
        self.release_at_ms.is_some()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    fn release_now(&mut self) {
        if self.release_at_ms.take().is_some() {
            self.output.set(false);
        }
    }
}
