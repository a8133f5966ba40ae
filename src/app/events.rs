//! Outbound loop events.
//!
//! The [`ControlLoop`](super::control_loop::ControlLoop) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Every cycle
//! produces exactly one [`LoopEvent::Cycle`] carrying either the snapshot
//! and actuation outcome, or the reason the cycle was skipped.

use serde::Serialize;

use super::snapshot::{ActuationIntent, SensorSnapshot};
use crate::error::{ActuatorFault, InferenceError, SnapshotError};

/// Structured events emitted by the control loop.
#[derive(Debug, Clone)]
pub enum LoopEvent {
    /// The decision engine was accepted and the loop entered `Running`.
    Started {
        model_version: String,
        interval_ms: u32,
    },

    /// The decision engine could not be constructed; the loop stays `Idle`.
    StartupFailed(String),

    /// One cycle finished (successfully or not).
    Cycle(CycleRecord),

    /// The loop reached `Stopped`.  Emitted exactly once.
    Stopped { reason: StopReason, stats: CycleStats },
}

/// Why the loop left `Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// External cancellation (signal or token).
    Cancelled,
    /// The configured number of cycles completed.
    CycleLimit,
    /// Defensive fatal path; carries the error text.
    Fatal(String),
}

impl StopReason {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Result of a single cycle.
#[derive(Debug, Clone)]
pub struct CycleRecord {
    /// 1-based cycle number since the loop started.
    pub cycle: u64,
    pub outcome: CycleOutcome,
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Intent decided and both actuator commands attempted.
    Actuated {
        snapshot: SensorSnapshot,
        intent: ActuationIntent,
        report: ActuationReport,
    },
    /// At least one reading was unavailable.  No actuator was touched.
    InvalidSnapshot(SnapshotError),
    /// The decision engine reported failure.  No actuator was touched.
    DecisionFailed {
        snapshot: SensorSnapshot,
        error: InferenceError,
    },
}

impl CycleOutcome {
    /// True when actuator commands were issued this cycle.
    pub fn actuated(&self) -> bool {
        matches!(self, Self::Actuated { .. })
    }
}

/// Per-actuator acknowledgement for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuationReport {
    pub fan_applied: bool,
    pub water_pump_applied: bool,
}

impl ActuationReport {
    pub fn all_applied(&self) -> bool {
        self.fan_applied && self.water_pump_applied
    }

    /// Actuators that refused their command, fan first.
    pub fn faults(&self) -> impl Iterator<Item = ActuatorFault> {
        let fan = (!self.fan_applied).then_some(ActuatorFault::Fan);
        let pump = (!self.water_pump_applied).then_some(ActuatorFault::WaterPump);
        fan.into_iter().chain(pump)
    }
}

/// Running counters over the loop's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    pub cycles: u64,
    pub actuated: u64,
    pub invalid_snapshots: u64,
    pub decision_failures: u64,
    pub actuator_failures: u64,
}

impl CycleStats {
    pub(crate) fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Actuated { report, .. } => {
                self.actuated += 1;
                self.actuator_failures += report.faults().count() as u64;
            }
            CycleOutcome::InvalidSnapshot(_) => self.invalid_snapshots += 1,
            CycleOutcome::DecisionFailed { .. } => self.decision_failures += 1,
        }
    }
}
