//! Integration tests for the ControlLoop → DecisionEngine → actuators
//! pipeline: per-cycle failure isolation, actuator independence and
//! cancellation.

use std::time::{Duration, Instant};

use greenhouse::app::control_loop::ControlLoop;
use greenhouse::app::events::{CycleOutcome, LoopEvent, StopReason};
use greenhouse::app::lifecycle::LoopState;
use greenhouse::app::shutdown::ShutdownToken;
use greenhouse::app::snapshot::SensorChannel;
use greenhouse::decision::DecisionEngine;
use greenhouse::decision::classifier::Classifier;
use greenhouse::error::{ActuatorFault, LoopError};

use crate::mock_hw::{
    ActuatorCall, FailingClassifier, FixedClassifier, MockActuators, MockSensors, RecordingSink,
};

type Loop<C> = ControlLoop<MockSensors, MockActuators, RecordingSink, C>;

fn started<C: Classifier>(
    classifier: C,
    sensors: MockSensors,
    actuators: MockActuators,
    interval: Duration,
) -> Loop<C> {
    let mut cl = ControlLoop::new(sensors, actuators, RecordingSink::new(), interval);
    cl.start(DecisionEngine::new(classifier)).unwrap();
    cl
}

fn fast<C: Classifier>(classifier: C, sensors: MockSensors, actuators: MockActuators) -> Loop<C> {
    started(classifier, sensors, actuators, Duration::from_millis(1))
}

// ── Snapshot failures ─────────────────────────────────────────

#[test]
fn any_missing_channel_blocks_actuation() {
    for channel in SensorChannel::ALL {
        let mut cl = fast(
            FixedClassifier(&[true, true]),
            MockSensors::without(channel),
            MockActuators::new(),
        );
        let outcome = cl.run_cycle().unwrap();
        match outcome {
            CycleOutcome::InvalidSnapshot(e) => assert_eq!(e.missing.as_slice(), &[channel]),
            other => panic!("{channel}: expected invalid snapshot, got {other:?}"),
        }
        assert!(cl.actuators().calls.is_empty(), "{channel}: actuators touched");
    }
}

#[test]
fn all_six_channels_are_read_even_after_a_miss() {
    let mut cl = fast(
        FixedClassifier(&[true, true]),
        MockSensors::without(SensorChannel::Temperature),
        MockActuators::new(),
    );
    cl.run_cycle().unwrap();
    assert_eq!(cl.sensors().reads, 4, "temperature, humidity, water level, npk");
}

#[test]
fn transient_sensor_failure_self_heals_next_cycle() {
    let mut cl = fast(
        FixedClassifier(&[false, true]),
        MockSensors::without(SensorChannel::Humidity),
        MockActuators::new(),
    );
    assert!(!cl.run_cycle().unwrap().actuated());

    cl.sensors_mut().readings[SensorChannel::Humidity as usize] = Some(55.0);
    assert!(cl.run_cycle().unwrap().actuated());
    assert_eq!(
        cl.actuators().calls,
        [ActuatorCall::SetFan(false), ActuatorCall::SetWaterPump(true)]
    );
    assert_eq!(cl.stats().invalid_snapshots, 1);
    assert_eq!(cl.stats().actuated, 1);
}

// ── Decision failures ─────────────────────────────────────────

#[test]
fn failed_inference_blocks_actuation() {
    let mut cl = fast(FailingClassifier, MockSensors::reference(), MockActuators::new());
    let outcome = cl.run_cycle().unwrap();
    assert!(matches!(outcome, CycleOutcome::DecisionFailed { .. }));
    assert!(cl.actuators().calls.is_empty());
    assert_eq!(cl.stats().decision_failures, 1);
}

#[test]
fn malformed_output_arity_blocks_actuation() {
    let mut cl = fast(
        FixedClassifier(&[true]),
        MockSensors::reference(),
        MockActuators::new(),
    );
    assert!(matches!(
        cl.run_cycle().unwrap(),
        CycleOutcome::DecisionFailed { .. }
    ));
    assert!(cl.actuators().calls.is_empty());
}

// ── Actuator independence ─────────────────────────────────────

#[test]
fn fan_failure_does_not_block_pump() {
    let mut cl = fast(
        FixedClassifier(&[true, true]),
        MockSensors::reference(),
        MockActuators::failing(true, false),
    );
    let outcome = cl.run_cycle().unwrap();
    assert_eq!(
        cl.actuators().calls,
        [ActuatorCall::SetFan(true), ActuatorCall::SetWaterPump(true)]
    );
    let CycleOutcome::Actuated { report, .. } = outcome else {
        panic!("cycle should still count as actuated");
    };
    assert_eq!(report.faults().collect::<Vec<_>>(), [ActuatorFault::Fan]);
    assert_eq!(cl.stats().actuator_failures, 1);
}

#[test]
fn pump_failure_does_not_roll_back_fan() {
    let mut cl = fast(
        FixedClassifier(&[true, false]),
        MockSensors::reference(),
        MockActuators::failing(false, true),
    );
    let outcome = cl.run_cycle().unwrap();
    assert_eq!(cl.actuators().fan_calls(), 1);
    assert_eq!(cl.actuators().pump_calls(), 1);
    let CycleOutcome::Actuated { report, .. } = outcome else {
        panic!("cycle should still count as actuated");
    };
    assert!(report.fan_applied);
    assert!(!report.water_pump_applied);
}

#[test]
fn both_commands_reapplied_every_cycle() {
    let mut cl = fast(
        FixedClassifier(&[false, false]),
        MockSensors::reference(),
        MockActuators::new(),
    );
    for _ in 0..3 {
        cl.run_cycle().unwrap();
    }
    assert_eq!(cl.actuators().fan_calls(), 3);
    assert_eq!(cl.actuators().pump_calls(), 3);
}

// ── Lifecycle and cancellation ────────────────────────────────

#[test]
fn cancellation_during_sleep_stops_promptly() {
    let interval = Duration::from_secs(30);
    let mut cl = started(
        FixedClassifier(&[true, false]),
        MockSensors::reference(),
        MockActuators::new(),
        interval,
    );

    let token = ShutdownToken::new();
    let remote = token.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        remote.request();
    });

    let t0 = Instant::now();
    let stats = cl.run_blocking(&token).unwrap();
    let elapsed = t0.elapsed();
    canceller.join().unwrap();

    assert!(elapsed < interval / 10, "shutdown took {elapsed:?}");
    assert_eq!(stats.cycles, 1, "no new cycle after cancellation");
    assert_eq!(cl.actuators().calls.len(), 2);
    assert_eq!(cl.state(), LoopState::Stopped);
    assert_eq!(cl.sink().stop_reasons(), [StopReason::Cancelled]);
}

#[test]
fn stopped_loop_issues_no_further_commands() {
    let mut cl = fast(
        FixedClassifier(&[true, true]),
        MockSensors::reference(),
        MockActuators::new(),
    )
    .with_cycle_limit(2);
    cl.run_blocking(&ShutdownToken::new()).unwrap();
    let calls_at_stop = cl.actuators().calls.len();
    let reads_at_stop = cl.sensors().reads;

    assert_eq!(
        cl.run_cycle().unwrap_err(),
        LoopError::NotRunning(LoopState::Stopped)
    );
    assert!(cl.run_blocking(&ShutdownToken::new()).is_err());
    assert_eq!(cl.actuators().calls.len(), calls_at_stop);
    assert_eq!(cl.sensors().reads, reads_at_stop);
}

#[test]
fn actuators_keep_last_state_after_stop() {
    let mut cl = fast(
        FixedClassifier(&[true, true]),
        MockSensors::reference(),
        MockActuators::new(),
    )
    .with_cycle_limit(1);
    cl.run_blocking(&ShutdownToken::new()).unwrap();
    // No forced "safe state" on the way out.
    assert_eq!(
        cl.actuators().calls.last(),
        Some(&ActuatorCall::SetWaterPump(true))
    );
}

#[test]
fn event_stream_is_started_cycles_stopped() {
    let mut cl = fast(
        FixedClassifier(&[false, true]),
        MockSensors::reference(),
        MockActuators::new(),
    )
    .with_cycle_limit(3);
    let stats = cl.run_blocking(&ShutdownToken::new()).unwrap();

    let events = &cl.sink().events;
    assert!(matches!(events.first(), Some(LoopEvent::Started { .. })));
    assert!(matches!(
        events.last(),
        Some(LoopEvent::Stopped { reason: StopReason::CycleLimit, .. })
    ));
    let numbers: Vec<u64> = cl.sink().cycles().map(|r| r.cycle).collect();
    assert_eq!(numbers, [1, 2, 3]);
    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.actuated, 3);
}
