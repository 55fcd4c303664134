//! Function-pointer state machine for the server registration lifecycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌───────────────┬───────────┬──────────┬──────────────────┐   │
//! │  │ State         │ on_enter  │ on_exit  │ on_event         │   │
//! │  ├───────────────┼───────────┼──────────┼──────────────────┤   │
//! │  │ Disconnected  │ -         │ -        │ fn(ev)->Option<> │   │
//! │  │ Connecting    │ fn(ctx)   │ -        │ fn(ev)->Option<> │   │
//! │  │ Registering   │ fn(ctx)   │ -        │ fn(ev)->Option<> │   │
//! │  │ Registered    │ fn(ctx)   │ fn(ctx)  │ fn(ev)->Option<> │   │
//! │  │ Unregistering │ fn(ctx)   │ fn(ctx)  │ fn(ev)->Option<> │   │
//! │  │ Failed        │ fn(ctx)   │ -        │ fn(ev)->Option<> │   │
//! │  └───────────────┴───────────┴──────────┴──────────────────┘   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each event is offered to the **current** state's `on_event`.  If it
//! returns `Some(next)`, the engine runs `on_exit` for the current state,
//! then `on_enter` for the next.  Entry actions record transport requests
//! in the [`RegistrationContext`]; they never talk to the transport
//! directly.  An event the current state does not handle is ignored.
//!
//! Retry after `Failed` is the caller's decision (send `Reset`, then
//! `Start` again).

pub mod context;
pub mod states;

pub use context::{RegistrationContext, TransportRequest};

use log::{debug, info};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RegistrationState {
    Disconnected = 0,
    Connecting = 1,
    Registering = 2,
    Registered = 3,
    Unregistering = 4,
    Failed = 5,
}

impl RegistrationState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Disconnected,
        Self::Connecting,
        Self::Registering,
        Self::Registered,
        Self::Unregistering,
        Self::Failed,
    ];

    /// Convert an index back to a state.  Out-of-range indices are a
    /// programming error; release builds fall back to `Failed`.
    pub fn from_index(idx: usize) -> Self {
        match Self::ALL.get(idx) {
            Some(s) => *s,
            None => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Failed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationEvent {
    Start,
    TransportReady,
    TransportError,
    Timeout,
    AckReceived,
    Unregister,
    TransportLost,
    Reset,
}

impl RegistrationEvent {
    pub const ALL: [Self; 8] = [
        Self::Start,
        Self::TransportReady,
        Self::TransportError,
        Self::Timeout,
        Self::AckReceived,
        Self::Unregister,
        Self::TransportLost,
        Self::Reset,
    ];
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut RegistrationContext);

/// Transition function: `Some(next)` to move, `None` to stay.
pub type StateEventFn = fn(RegistrationEvent) -> Option<RegistrationState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: RegistrationState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_event: StateEventFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct RegistrationMachine {
    /// Fixed-size table indexed by `RegistrationState as usize`.
    table: [StateDescriptor; RegistrationState::COUNT],
    current: usize,
    transitions: u32,
}

impl RegistrationMachine {
    pub fn new(table: [StateDescriptor; RegistrationState::COUNT], initial: RegistrationState) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Offer `event` to the current state.
    ///
    /// Returns `Some((from, to))` when a transition happened.
    pub fn handle(
        &mut self,
        event: RegistrationEvent,
        ctx: &mut RegistrationContext,
    ) -> Option<(RegistrationState, RegistrationState)> {
        let from = self.current_state();
        let Some(next) = (self.table[self.current].on_event)(event) else {
            debug!(
                "registration: {:?} ignored in {}",
                event, self.table[self.current].name
            );
            return None;
        };
        self.transition(next, ctx);
        Some((from, next))
    }

    pub fn current_state(&self) -> RegistrationState {
        RegistrationState::from_index(self.current)
    }

    pub fn state_name(&self) -> &'static str {
        self.table[self.current].name
    }

    /// `true` iff the state is exactly `Registered`.
    pub fn is_registered(&self) -> bool {
        self.current_state() == RegistrationState::Registered
    }

    /// Transitions taken since construction.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: RegistrationState, ctx: &mut RegistrationContext) {
        let next_idx = next as usize;

        info!(
            "registration: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transitions = self.transitions.wrapping_add(1);

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

impl Default for RegistrationMachine {
    fn default() -> Self {
        Self::new(states::build_state_table(), RegistrationState::Disconnected)
    }
}
