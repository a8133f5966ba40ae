//! Per-cycle value types: sensor snapshot, feature vector, actuation intent.
//!
//! A [`SensorSnapshot`] is built fresh every cycle from six
//! [`SensorPort`](super::ports::SensorPort) reads and consumed immediately
//! by the decision engine.  If any read is unavailable the snapshot is not
//! built at all: [`assemble`] returns the list of missing channels instead,
//! and the loop skips actuation for that cycle.

use core::fmt;

use serde::Serialize;

use super::ports::SensorPort;
use crate::error::{MissingChannels, SnapshotError};

// ---------------------------------------------------------------------------
// Sensor channels
// ---------------------------------------------------------------------------

/// Every reading that makes up a snapshot, in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SensorChannel {
    Temperature = 0,
    Humidity = 1,
    WaterLevel = 2,
    Nitrogen = 3,
    Phosphorus = 4,
    Potassium = 5,
}

impl SensorChannel {
    /// Number of channels, which is also the feature-vector arity.
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Temperature,
        Self::Humidity,
        Self::WaterLevel,
        Self::Nitrogen,
        Self::Phosphorus,
        Self::Potassium,
    ];

    /// Column name the classifier was trained on.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::WaterLevel => "water_level",
            Self::Nitrogen => "N",
            Self::Phosphorus => "P",
            Self::Potassium => "K",
        }
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One complete set of readings.  Only constructible with all six values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorSnapshot {
    /// Air temperature (°C).
    pub temperature_c: f32,
    /// Relative humidity (%).
    pub humidity_pct: f32,
    /// Reservoir water level (%).
    pub water_level_pct: f32,
    /// Soil nitrogen (sensor units).
    pub nitrogen: f32,
    /// Soil phosphorus (sensor units).
    pub phosphorus: f32,
    /// Soil potassium (sensor units).
    pub potassium: f32,
}

impl SensorSnapshot {
    /// Feature vector in the classifier's fixed column order:
    /// `[temperature, humidity, water_level, N, P, K]`.
    pub fn features(&self) -> FeatureVector {
        [
            self.temperature_c,
            self.humidity_pct,
            self.water_level_pct,
            self.nitrogen,
            self.phosphorus,
            self.potassium,
        ]
    }

    pub fn get(&self, channel: SensorChannel) -> f32 {
        self.features()[channel as usize]
    }
}

/// Ordered numeric input to the classifier.
pub type FeatureVector = [f32; SensorChannel::COUNT];

/// Read all six channels and build a snapshot.
///
/// Every channel is read even after a failure so the log names all
/// missing channels at once.  Non-finite readings count as unavailable.
pub fn assemble(sensors: &mut impl SensorPort) -> Result<SensorSnapshot, SnapshotError> {
    let temperature = sensors.read_temperature();
    let humidity = sensors.read_humidity();
    let water_level = sensors.read_water_level();
    let (n, p, k) = sensors.read_npk();

    let raw = [temperature, humidity, water_level, n, p, k];
    let mut values: FeatureVector = [0.0; SensorChannel::COUNT];
    let mut missing = MissingChannels::new();

    for (channel, reading) in SensorChannel::ALL.into_iter().zip(raw) {
        match reading {
            Some(v) if v.is_finite() => values[channel as usize] = v,
            // Capacity equals the channel count, so the push cannot fail.
            _ => {
                let _ = missing.push(channel);
            }
        }
    }

    if !missing.is_empty() {
        return Err(SnapshotError { missing });
    }

    let [temperature_c, humidity_pct, water_level_pct, nitrogen, phosphorus, potassium] = values;
    Ok(SensorSnapshot {
        temperature_c,
        humidity_pct,
        water_level_pct,
        nitrogen,
        phosphorus,
        potassium,
    })
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// Actuator commands decided for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActuationIntent {
    pub fan_on: bool,
    pub water_pump_on: bool,
}

pub(crate) fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

impl fmt::Display for ActuationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fan={} pump={}",
            on_off(self.fan_on),
            on_off(self.water_pump_on)
        )
    }
}
