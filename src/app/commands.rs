//! Inbound commands to the event dispatcher.
//!
//! Resource handlers never act directly: they return one of these and the
//! [`EventDispatcher`](super::dispatcher::EventDispatcher) applies it on the
//! control loop.  The surrounding application (retry policy, console) uses
//! the same entry point.

/// Commands that handlers and external adapters send into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Play a blink pattern.  `None` plays the value stored in the
    /// pattern resource.
    StartBlink { pattern: Option<String> },

    /// Cancel any running blink sequence.
    StopBlink,

    /// Deregister; the dispatcher exits once the server acknowledges.
    Unregister,

    /// Leave the `Failed` state.  Registration itself only starts through
    /// [`EventDispatcher::start_registration`](super::dispatcher::EventDispatcher::start_registration),
    /// which checks the credential store first.
    ResetRegistration,
}
