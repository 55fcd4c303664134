//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules for the node: which resources exist,
//! how remote requests and hardware events reach them, and how the
//! registration lifecycle is driven.  All interaction with hardware and
//! the network happens through **port traits** defined in [`ports`], so
//! this layer is fully testable without real peripherals.

pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod resources;
