//! Concrete registration handlers and table builder.
//!
//! ```text
//!  DISCONNECTED ──[Start]──▶ CONNECTING ──[TransportReady]──▶ REGISTERING
//!       ▲                        │                               │
//!       │              [TransportError | Timeout]          [AckReceived]
//!       │                        ▼                               ▼
//!       ├───────[Reset]───── FAILED ◀──[TransportLost]──── REGISTERED
//!       │                        ▲                               │
//!       │                        └──[TransportError | Timeout]   │
//!       │                             (from REGISTERING)    [Unregister]
//!       │                                                        ▼
//!       └────────────────────[AckReceived]──────────────── UNREGISTERING
//! ```
//!
//! Any (state, event) pair not drawn above leaves the state unchanged.

use super::context::{RegistrationContext, TransportRequest};
use super::{RegistrationEvent, RegistrationState, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

pub fn build_state_table() -> [StateDescriptor; RegistrationState::COUNT] {
    [
        // Index 0: Disconnected
        StateDescriptor {
            id: RegistrationState::Disconnected,
            name: "Disconnected",
            on_enter: None,
            on_exit: None,
            on_event: disconnected_event,
        },
        // Index 1: Connecting
        StateDescriptor {
            id: RegistrationState::Connecting,
            name: "Connecting",
            on_enter: Some(connecting_enter),
            on_exit: None,
            on_event: connecting_event,
        },
        // Index 2: Registering
        StateDescriptor {
            id: RegistrationState::Registering,
            name: "Registering",
            on_enter: Some(registering_enter),
            on_exit: None,
            on_event: registering_event,
        },
        // Index 3: Registered
        StateDescriptor {
            id: RegistrationState::Registered,
            name: "Registered",
            on_enter: Some(registered_enter),
            on_exit: Some(registered_exit),
            on_event: registered_event,
        },
        // Index 4: Unregistering
        StateDescriptor {
            id: RegistrationState::Unregistering,
            name: "Unregistering",
            on_enter: Some(unregistering_enter),
            on_exit: Some(unregistering_exit),
            on_event: unregistering_event,
        },
        // Index 5: Failed
        StateDescriptor {
            id: RegistrationState::Failed,
            name: "Failed",
            on_enter: Some(failed_enter),
            on_exit: None,
            on_event: failed_event,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISCONNECTED
// ═══════════════════════════════════════════════════════════════════════════

fn disconnected_event(event: RegistrationEvent) -> Option<RegistrationState> {
    match event {
        RegistrationEvent::Start => Some(RegistrationState::Connecting),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTING
// ═══════════════════════════════════════════════════════════════════════════

fn connecting_enter(ctx: &mut RegistrationContext) {
    ctx.unregistered_by_request = false;
    ctx.request(TransportRequest::Connect);
    info!("CONNECTING: network and security bring-up requested");
}

fn connecting_event(event: RegistrationEvent) -> Option<RegistrationState> {
    match event {
        RegistrationEvent::TransportReady => Some(RegistrationState::Registering),
        RegistrationEvent::TransportError | RegistrationEvent::Timeout => {
            Some(RegistrationState::Failed)
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  REGISTERING
// ═══════════════════════════════════════════════════════════════════════════

fn registering_enter(ctx: &mut RegistrationContext) {
    ctx.request(TransportRequest::Register);
    info!("REGISTERING: announcing resources");
}

fn registering_event(event: RegistrationEvent) -> Option<RegistrationState> {
    match event {
        RegistrationEvent::AckReceived => Some(RegistrationState::Registered),
        RegistrationEvent::TransportError | RegistrationEvent::Timeout => {
            Some(RegistrationState::Failed)
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  REGISTERED
// ═══════════════════════════════════════════════════════════════════════════

fn registered_enter(ctx: &mut RegistrationContext) {
    ctx.notifications_enabled = true;
    info!("REGISTERED: notifications enabled");
}

fn registered_exit(ctx: &mut RegistrationContext) {
    ctx.notifications_enabled = false;
}

fn registered_event(event: RegistrationEvent) -> Option<RegistrationState> {
    match event {
        RegistrationEvent::Unregister => Some(RegistrationState::Unregistering),
        RegistrationEvent::TransportLost => Some(RegistrationState::Failed),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNREGISTERING
// ═══════════════════════════════════════════════════════════════════════════

fn unregistering_enter(ctx: &mut RegistrationContext) {
    ctx.request(TransportRequest::Deregister);
    info!("UNREGISTERING: deregistration requested");
}

// The only way out of Unregistering is the server's ack, so leaving it
// always means a requested disconnect.
fn unregistering_exit(ctx: &mut RegistrationContext) {
    ctx.unregistered_by_request = true;
}

fn unregistering_event(event: RegistrationEvent) -> Option<RegistrationState> {
    match event {
        RegistrationEvent::AckReceived => Some(RegistrationState::Disconnected),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  FAILED
// ═══════════════════════════════════════════════════════════════════════════

fn failed_enter(_ctx: &mut RegistrationContext) {
    warn!("FAILED: registration aborted, waiting for reset");
}

fn failed_event(event: RegistrationEvent) -> Option<RegistrationState> {
    match event {
        RegistrationEvent::Reset => Some(RegistrationState::Disconnected),
        _ => None,
    }
}
