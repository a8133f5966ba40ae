//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, event sinks, config storage)
//! implement these traits.  The [`ControlLoop`](super::control_loop::ControlLoop)
//! owns one sensor port and one actuator port for its whole lifetime, so
//! the domain core never touches hardware directly.

use crate::config::{ConfigError, SystemConfig};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per channel each cycle.
///
/// `None` means the reading is unavailable this cycle.  Absence is an
/// ordinary outcome, not an error path; the loop decides what to do
/// with it.  The reads have no ordering requirement between them.
pub trait SensorPort {
    /// Air temperature in °C.
    fn read_temperature(&mut self) -> Option<f32>;

    /// Relative humidity in %.
    fn read_humidity(&mut self) -> Option<f32>;

    /// Reservoir water level in %.
    fn read_water_level(&mut self) -> Option<f32>;

    /// Soil nitrogen, phosphorus and potassium, each independently
    /// available or not.
    fn read_npk(&mut self) -> (Option<f32>, Option<f32>, Option<f32>);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
///
/// Each call returns whether the command was applied.  Commands must be
/// idempotent: re-applying the current state is a safe no-op that still
/// reports success.
pub trait ActuatorPort {
    /// Switch the ventilation fan.
    fn set_fan(&mut self, on: bool) -> bool;

    /// Switch the irrigation water pump.
    fn set_water_pump(&mut self, on: bool) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The loop emits structured [`LoopEvent`](super::events::LoopEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LoopEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ← persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads one configuration layer.
///
/// The result is a layer, not a final config: later layers may still
/// override any field, so range checks belong to the caller, which runs
/// [`SystemConfig::validate`] once on the merged result.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// Mutable references forward, so a loop can hold an exclusive borrow of
// ports whose owner wants them back afterwards.

impl<S: SensorPort + ?Sized> SensorPort for &mut S {
    fn read_temperature(&mut self) -> Option<f32> {
        (**self).read_temperature()
    }

    fn read_humidity(&mut self) -> Option<f32> {
        (**self).read_humidity()
    }

    fn read_water_level(&mut self) -> Option<f32> {
        (**self).read_water_level()
    }

    fn read_npk(&mut self) -> (Option<f32>, Option<f32>, Option<f32>) {
        (**self).read_npk()
    }
}

impl<A: ActuatorPort + ?Sized> ActuatorPort for &mut A {
    fn set_fan(&mut self, on: bool) -> bool {
        (**self).set_fan(on)
    }

    fn set_water_pump(&mut self, on: bool) -> bool {
        (**self).set_water_pump(on)
    }
}

impl<K: EventSink + ?Sized> EventSink for &mut K {
    fn emit(&mut self, event: &super::events::LoopEvent) {
        (**self).emit(event);
    }
}
