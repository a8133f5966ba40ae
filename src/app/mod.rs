//! Application core — pure domain logic, zero I/O.
//!
//! The greenhouse control loop and the value types it moves between
//! sensors, the decision engine and actuators.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod control_loop;
pub mod events;
pub mod lifecycle;
pub mod ports;
pub mod shutdown;
pub mod snapshot;
