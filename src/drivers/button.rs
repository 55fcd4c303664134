//! Interrupt-to-loop button handoff.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The GPIO fires on the
//! falling edge; the ISR calls [`ButtonLatch::on_edge`], which only
//! touches two atomics.  The control loop calls [`ButtonLatch::take`] once
//! per iteration.
//!
//! ```text
//!   ISR  ──on_edge()──▶  count += 1, pending = true
//!   loop ──take()─────▶  pending? → Some(count), pending = false
//! ```
//!
//! A burst of edges between two iterations collapses into one pending
//! flag, but the counter still reflects every edge.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Latch fed by the button ISR.  Registered as a `static` because the ISR
/// has no other way to reach it.
pub static BUTTON_LATCH: ButtonLatch = ButtonLatch::new();

pub struct ButtonLatch {
    pending: AtomicBool,
    count: AtomicU32,
}

impl ButtonLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            count: AtomicU32::new(0),
        }
    }

    /// Record one edge.  Lock-free and allocation-free, safe from
    /// interrupt context.
    pub fn on_edge(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
        // Release orders the count store before the flag.
        self.pending.store(true, Ordering::Release);
    }

    /// Clear the pending flag and return the edge count if it was set.
    pub fn take(&self) -> Option<u32> {
        if self.pending.swap(false, Ordering::Acquire) {
            Some(self.count.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Edges seen so far, without touching the pending flag.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for ButtonLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// ISR entry point for the board's button GPIO.
#[allow(unused)]
pub fn button_isr_handler() {
    BUTTON_LATCH.on_edge();
}
