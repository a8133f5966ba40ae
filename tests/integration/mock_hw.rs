//! Mock hardware adapters for integration tests.
//!
//! Records every actuator call and every emitted event so tests can assert
//! on the full command history without touching real GPIO.

use greenhouse::app::events::{CycleRecord, LoopEvent, StopReason};
use greenhouse::app::ports::{ActuatorPort, EventSink, SensorPort};
use greenhouse::app::snapshot::SensorChannel;
use greenhouse::decision::classifier::{Classifier, Prediction};
use greenhouse::error::InferenceError;

/// Reference readings: T=31, RH=40, WL=90, N=130, P=90, K=100.
pub const REFERENCE: [f32; 6] = [31.0, 40.0, 90.0, 130.0, 90.0, 100.0];

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    SetFan(bool),
    SetWaterPump(bool),
}

// ── MockActuators ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockActuators {
    pub calls: Vec<ActuatorCall>,
    pub fail_fan: bool,
    pub fail_pump: bool,
}

#[allow(dead_code)]
impl MockActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(fail_fan: bool, fail_pump: bool) -> Self {
        Self {
            calls: Vec::new(),
            fail_fan,
            fail_pump,
        }
    }

    pub fn fan_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::SetFan(_)))
            .count()
    }

    pub fn pump_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::SetWaterPump(_)))
            .count()
    }
}

impl ActuatorPort for MockActuators {
    fn set_fan(&mut self, on: bool) -> bool {
        self.calls.push(ActuatorCall::SetFan(on));
        !self.fail_fan
    }

    fn set_water_pump(&mut self, on: bool) -> bool {
        self.calls.push(ActuatorCall::SetWaterPump(on));
        !self.fail_pump
    }
}

// ── MockSensors ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockSensors {
    pub readings: [Option<f32>; 6],
    /// Number of `read_*` calls served (`read_npk` counts once).
    pub reads: u32,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn reference() -> Self {
        Self {
            readings: REFERENCE.map(Some),
            reads: 0,
        }
    }

    pub fn without(channel: SensorChannel) -> Self {
        let mut s = Self::reference();
        s.readings[channel as usize] = None;
        s
    }
}

impl SensorPort for MockSensors {
    fn read_temperature(&mut self) -> Option<f32> {
        self.reads += 1;
        self.readings[0]
    }

    fn read_humidity(&mut self) -> Option<f32> {
        self.reads += 1;
        self.readings[1]
    }

    fn read_water_level(&mut self) -> Option<f32> {
        self.reads += 1;
        self.readings[2]
    }

    fn read_npk(&mut self) -> (Option<f32>, Option<f32>, Option<f32>) {
        self.reads += 1;
        (self.readings[3], self.readings[4], self.readings[5])
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<LoopEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycles(&self) -> impl Iterator<Item = &CycleRecord> {
        self.events.iter().filter_map(|e| match e {
            LoopEvent::Cycle(record) => Some(record),
            _ => None,
        })
    }

    pub fn stop_reasons(&self) -> Vec<StopReason> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LoopEvent::Stopped { reason, .. } => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LoopEvent) {
        self.events.push(event.clone());
    }
}

// ── Classifier doubles ────────────────────────────────────────

/// Always returns the same outputs, whatever the input.
pub struct FixedClassifier(pub &'static [bool]);

impl Classifier for FixedClassifier {
    fn input_arity(&self) -> usize {
        6
    }

    fn version(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _features: &[f32]) -> Result<Prediction, InferenceError> {
        Prediction::from_slice(self.0).map_err(|_| InferenceError::Backend("too many outputs"))
    }
}

/// Always reports an inference failure.
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn input_arity(&self) -> usize {
        6
    }

    fn predict(&self, _features: &[f32]) -> Result<Prediction, InferenceError> {
        Err(InferenceError::Backend("inference runtime unavailable"))
    }
}

// ── Model artifact ────────────────────────────────────────────

/// Two-head forest: fan on above 30 °C, pump on below 50 % humidity.
#[allow(dead_code)]
pub const STUMP_FOREST: &str = r#"{
  "format_version": 1,
  "model_version": "stump-forest",
  "kind": "forest",
  "features": ["tempreature", "humidity", "water_level", "N", "P", "K"],
  "heads": [
    { "label": "Fan_actuator_ON", "trees": [ { "nodes": [
        { "split": { "feature": 0, "threshold": 30.0, "left": 1, "right": 2 } },
        { "leaf": { "value": 0.0 } },
        { "leaf": { "value": 1.0 } }
    ] } ] },
    { "label": "Watering_plant_pump_ON", "trees": [ { "nodes": [
        { "split": { "feature": 1, "threshold": 50.0, "left": 1, "right": 2 } },
        { "leaf": { "value": 1.0 } },
        { "leaf": { "value": 0.0 } }
    ] } ] }
  ]
}"#;
