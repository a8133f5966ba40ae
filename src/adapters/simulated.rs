//! Simulated sensor bank and actuators for development and tests.
//!
//! The sensors return fixed readings (configurable, and individually
//! switchable to "unavailable").  The actuators record the last commanded
//! state in their own fields and always succeed unless a fault is injected.

use log::{debug, info, warn};

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::app::snapshot::{SensorChannel, on_off};
use crate::config::SimulationConfig;
use crate::error::ActuatorFault;

// ── Sensors ───────────────────────────────────────────────────

/// Fixed-value sensor bank.  Reads are pure.
#[derive(Debug, Clone)]
pub struct SimulatedSensors {
    readings: [Option<f32>; SensorChannel::COUNT],
}

impl Default for SimulatedSensors {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

impl SimulatedSensors {
    pub fn new(cfg: &SimulationConfig) -> Self {
        Self {
            readings: [
                Some(cfg.temperature_c),
                Some(cfg.humidity_pct),
                Some(cfg.water_level_pct),
                Some(cfg.nitrogen),
                Some(cfg.phosphorus),
                Some(cfg.potassium),
            ],
        }
    }

    /// Override one channel; `None` makes it unavailable.
    pub fn set(&mut self, channel: SensorChannel, reading: Option<f32>) {
        self.readings[channel as usize] = reading;
    }

    /// Builder form of `set(channel, None)`.
    pub fn with_unavailable(mut self, channel: SensorChannel) -> Self {
        self.set(channel, None);
        self
    }

    fn get(&self, channel: SensorChannel) -> Option<f32> {
        self.readings[channel as usize]
    }
}

impl SensorPort for SimulatedSensors {
    fn read_temperature(&mut self) -> Option<f32> {
        self.get(SensorChannel::Temperature)
    }

    fn read_humidity(&mut self) -> Option<f32> {
        self.get(SensorChannel::Humidity)
    }

    fn read_water_level(&mut self) -> Option<f32> {
        self.get(SensorChannel::WaterLevel)
    }

    fn read_npk(&mut self) -> (Option<f32>, Option<f32>, Option<f32>) {
        (
            self.get(SensorChannel::Nitrogen),
            self.get(SensorChannel::Phosphorus),
            self.get(SensorChannel::Potassium),
        )
    }
}

// ── Actuators ─────────────────────────────────────────────────

/// In-memory fan and pump.  State lives in the instance, not in globals.
#[derive(Debug, Clone, Default)]
pub struct SimulatedActuators {
    fan_on: bool,
    water_pump_on: bool,
    fan_fault: bool,
    pump_fault: bool,
    commands: u64,
}

impl SimulatedActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fan_on(&self) -> bool {
        self.fan_on
    }

    pub fn water_pump_on(&self) -> bool {
        self.water_pump_on
    }

    /// Total `set_*` calls received, including refused ones.
    pub fn commands(&self) -> u64 {
        self.commands
    }

    /// Make one actuator refuse (or accept again) every command.
    pub fn set_fault(&mut self, which: ActuatorFault, faulted: bool) {
        match which {
            ActuatorFault::Fan => self.fan_fault = faulted,
            ActuatorFault::WaterPump => self.pump_fault = faulted,
        }
    }
}

fn apply(name: &str, state: &mut bool, on: bool, faulted: bool) -> bool {
    if faulted {
        warn!("{} (sim): fault injected, command {} refused", name, on_off(on));
        return false;
    }
    if *state == on {
        debug!("{} (sim): already {}", name, on_off(on));
    } else {
        info!("{} turned {}", name, on_off(on));
    }
    *state = on;
    true
}

impl ActuatorPort for SimulatedActuators {
    fn set_fan(&mut self, on: bool) -> bool {
        self.commands += 1;
        apply("Fan", &mut self.fan_on, on, self.fan_fault)
    }

    fn set_water_pump(&mut self, on: bool) -> bool {
        self.commands += 1;
        apply("Water pump", &mut self.water_pump_on, on, self.pump_fault)
    }
}
