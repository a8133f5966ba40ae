//! Control loop — the hexagonal core.
//!
//! [`ControlLoop`] exclusively owns one sensor port, one actuator port and
//! one event sink for its whole lifetime, plus the decision engine once
//! started.  It runs one cycle at a time, sleeping between cycles on a
//! cancellable timer.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          ControlLoop          │
//! ActuatorPort ◀──│ assemble · decide · actuate   │
//!                 └──────────────┬───────────────┘
//!                                ▼
//!                   ShutdownToken::sleep(interval)
//! ```
//!
//! Per-cycle failures (missing reading, failed inference, refused actuator
//! command) are isolated to that cycle.  Only a broken invariant or a
//! panic inside a cycle ends the loop on the fatal path.

use core::time::Duration;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, error, info};

use crate::config::SystemConfig;
use crate::decision::DecisionEngine;
use crate::decision::classifier::Classifier;
use crate::decision::forest::ForestClassifier;
use crate::diagnostics::panic_reason;
use crate::error::{LoopError, ModelError, StartupError};

use super::events::{ActuationReport, CycleOutcome, CycleRecord, CycleStats, LoopEvent, StopReason};
use super::lifecycle::{Lifecycle, LoopState};
use super::ports::{ActuatorPort, EventSink, SensorPort};
use super::shutdown::{ShutdownToken, Wake};
use super::snapshot;

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop<S, A, K, C = ForestClassifier> {
    sensors: S,
    actuators: A,
    sink: K,
    engine: Option<DecisionEngine<C>>,
    lifecycle: Lifecycle,
    interval: Duration,
    max_cycles: Option<u64>,
    stats: CycleStats,
}

impl<S, A, K, C> ControlLoop<S, A, K, C>
where
    S: SensorPort,
    A: ActuatorPort,
    K: EventSink,
    C: Classifier,
{
    /// Build an `Idle` loop.  No port is touched until [`start`](Self::start).
    pub fn new(sensors: S, actuators: A, sink: K, interval: Duration) -> Self {
        Self {
            sensors,
            actuators,
            sink,
            engine: None,
            lifecycle: Lifecycle::new(),
            interval,
            max_cycles: None,
            stats: CycleStats::default(),
        }
    }

    /// Interval and cycle limit taken from a validated config.
    pub fn from_config(sensors: S, actuators: A, sink: K, config: &SystemConfig) -> Self {
        let interval = Duration::from_millis(u64::from(config.cycle_interval_ms));
        let mut this = Self::new(sensors, actuators, sink, interval);
        this.max_cycles = config.max_cycles;
        this
    }

    /// Stop gracefully after `limit` cycles.
    pub fn with_cycle_limit(mut self, limit: u64) -> Self {
        self.max_cycles = Some(limit);
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Attach the result of engine construction.
    ///
    /// `Ok` moves the loop `Idle → Running`.  `Err` is reported through the
    /// sink and returned; the loop stays `Idle` and will not run.
    pub fn start(
        &mut self,
        engine: Result<DecisionEngine<C>, ModelError>,
    ) -> Result<(), StartupError> {
        let state = self.lifecycle.current();
        if state != LoopState::Idle {
            return Err(StartupError::AlreadyStarted(state));
        }

        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => {
                self.sink.emit(&LoopEvent::StartupFailed(e.to_string()));
                return Err(e.into());
            }
        };

        let model_version = engine.model_version().to_owned();
        self.engine = Some(engine);
        self.lifecycle
            .transition(LoopState::Running)
            .map_err(StartupError::AlreadyStarted)?;
        self.sink.emit(&LoopEvent::Started {
            model_version,
            interval_ms: u32::try_from(self.interval.as_millis()).unwrap_or(u32::MAX),
        });
        Ok(())
    }

    /// Run one cycle: assemble → decide → actuate → emit.
    ///
    /// The returned `Err` is reserved for the defensive fatal path; every
    /// ordinary failure is reported inside the [`CycleOutcome`].
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, LoopError> {
        let state = self.lifecycle.current();
        if state != LoopState::Running {
            return Err(LoopError::NotRunning(state));
        }
        let engine = self.engine.as_ref().ok_or(LoopError::EngineMissing)?;

        let outcome = execute_cycle(&mut self.sensors, &mut self.actuators, engine);
        self.stats.record(&outcome);
        self.sink.emit(&LoopEvent::Cycle(CycleRecord {
            cycle: self.stats.cycles,
            outcome: outcome.clone(),
        }));
        Ok(outcome)
    }

    /// Cycle until cancelled, the cycle limit is reached, or a fatal error.
    ///
    /// Cancellation is checked before every cycle and raced against the
    /// inter-cycle sleep.  A cycle that has begun always completes.
    pub async fn run(&mut self, shutdown: &ShutdownToken) -> Result<CycleStats, LoopError> {
        let state = self.lifecycle.current();
        if state != LoopState::Running {
            return Err(LoopError::NotRunning(state));
        }
        info!(
            "Control loop running (interval {} ms, limit {:?})",
            self.interval.as_millis(),
            self.max_cycles
        );

        loop {
            if shutdown.is_requested() {
                self.stop(StopReason::Cancelled);
                return Ok(self.stats);
            }
            if self.limit_reached() {
                self.stop(StopReason::CycleLimit);
                return Ok(self.stats);
            }

            let cycle = panic::catch_unwind(AssertUnwindSafe(|| self.run_cycle()))
                .unwrap_or_else(|payload| {
                    Err(LoopError::CyclePanicked(panic_reason(&*payload).to_owned()))
                });
            if let Err(e) = cycle {
                error!("Control loop fatal: {}", e);
                self.stop(StopReason::Fatal(e.to_string()));
                return Err(e);
            }

            // No sleep after the last permitted cycle.
            if self.limit_reached() {
                self.stop(StopReason::CycleLimit);
                return Ok(self.stats);
            }

            if shutdown.sleep(self.interval).await == Wake::Cancelled {
                self.stop(StopReason::Cancelled);
                return Ok(self.stats);
            }
        }
    }

    /// [`run`](Self::run) on the current thread.
    pub fn run_blocking(&mut self, shutdown: &ShutdownToken) -> Result<CycleStats, LoopError> {
        futures_lite::future::block_on(self.run(shutdown))
    }

    fn limit_reached(&self) -> bool {
        self.max_cycles.is_some_and(|limit| self.stats.cycles >= limit)
    }

    /// `Running → Stopped`, emitting the stop event once.  Actuators keep
    /// their last commanded state.
    fn stop(&mut self, reason: StopReason) {
        if self.lifecycle.transition(LoopState::Stopped).is_err() {
            return;
        }
        self.sink.emit(&LoopEvent::Stopped {
            reason,
            stats: self.stats,
        });
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn state(&self) -> LoopState {
        self.lifecycle.current()
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn engine(&self) -> Option<&DecisionEngine<C>> {
        self.engine.as_ref()
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    /// Reconfigure a port between cycles (fault injection, recalibration).
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn actuators_mut(&mut self) -> &mut A {
        &mut self.actuators
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Give the ports back, e.g. to inspect them after a run.
    pub fn into_parts(self) -> (S, A, K) {
        (self.sensors, self.actuators, self.sink)
    }
}

// ───────────────────────────────────────────────────────────────
// One cycle
// ───────────────────────────────────────────────────────────────

fn execute_cycle<C: Classifier>(
    sensors: &mut impl SensorPort,
    actuators: &mut impl ActuatorPort,
    engine: &DecisionEngine<C>,
) -> CycleOutcome {
    // 1. Snapshot: all six readings or nothing
    let snapshot = match snapshot::assemble(sensors) {
        Ok(s) => s,
        Err(e) => {
            debug!("Cycle skipped: {}", e);
            return CycleOutcome::InvalidSnapshot(e);
        }
    };

    // 2. Decide
    let intent = match engine.decide(&snapshot) {
        Ok(intent) => intent,
        Err(error) => {
            debug!("Cycle skipped: inference failed ({})", error);
            return CycleOutcome::DecisionFailed { snapshot, error };
        }
    };

    // 3. Actuate: both commands every cycle, neither gated on the other
    let fan_applied = actuators.set_fan(intent.fan_on);
    let water_pump_applied = actuators.set_water_pump(intent.water_pump_on);

    CycleOutcome::Actuated {
        snapshot,
        intent,
        report: ActuationReport {
            fan_applied,
            water_pump_applied,
        },
    }
}
