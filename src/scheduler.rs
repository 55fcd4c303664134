//! Periodic timers for polled work.
//!
//! The control loop runs at a fixed cadence (100 ms by default) but some
//! work, such as sensor sampling, wants a slower period.  An
//! [`IntervalTimer`] answers "is it time yet?" once per iteration without
//! any hardware timer or callback.
//!
//! ```text
//!  poll(now)   ──▶  first call arms the timer, returns false
//!              ──▶  now - last >= period  → true, last = now
//!              ──▶  otherwise             → false
//! ```

use log::debug;

// ═══════════════════════════════════════════════════════════════
//  IntervalTimer
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct IntervalTimer {
    label: &'static str,
    period_ms: u64,
    last_ms: Option<u64>,
    fired: u32,
}

impl IntervalTimer {
    pub fn new(label: &'static str, period_ms: u32) -> Self {
        Self {
            label,
            period_ms: u64::from(period_ms),
            last_ms: None,
            fired: 0,
        }
    }

    /// `true` once per elapsed period.  A late poll fires once and
    /// restarts the period from `now_ms`; missed periods are not replayed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return false;
        };
        if now_ms.saturating_sub(last) < self.period_ms {
            return false;
        }
        self.last_ms = Some(now_ms);
        self.fired = self.fired.wrapping_add(1);
        debug!("timer '{}' fired at {} ms", self.label, now_ms);
        true
    }

    /// Restart the period from `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn fired_count(&self) -> u32 {
        self.fired
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
