//! End-to-end scenarios: reference readings, a missing water-level read,
//! a missing model artifact, and a full run over a model file on disk.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use greenhouse::adapters::log_sink::LogEventSink;
use greenhouse::adapters::simulated::{SimulatedActuators, SimulatedSensors};
use greenhouse::app::control_loop::ControlLoop;
use greenhouse::app::events::{CycleOutcome, LoopEvent};
use greenhouse::app::lifecycle::LoopState;
use greenhouse::app::shutdown::ShutdownToken;
use greenhouse::app::snapshot::{SensorChannel, assemble};
use greenhouse::config::{LogFormat, SystemConfig};
use greenhouse::decision::DecisionEngine;
use greenhouse::error::{LoopError, ModelError, StartupError};

use crate::mock_hw::{
    ActuatorCall, FixedClassifier, MockActuators, MockSensors, REFERENCE, RecordingSink,
    STUMP_FOREST,
};

// ── Scenario A: reference readings, engine says (fan on, pump off) ──

#[test]
fn scenario_a_reference_readings_drive_fan_only() {
    let mut cl = ControlLoop::new(
        MockSensors::reference(),
        MockActuators::new(),
        RecordingSink::new(),
        Duration::from_millis(1),
    );
    cl.start(DecisionEngine::new(FixedClassifier(&[true, false])))
        .unwrap();
    cl.run_cycle().unwrap();

    assert_eq!(
        cl.actuators().calls,
        [ActuatorCall::SetFan(true), ActuatorCall::SetWaterPump(false)]
    );

    let record = cl.sink().cycles().next().unwrap();
    let CycleOutcome::Actuated {
        snapshot, intent, ..
    } = &record.outcome
    else {
        panic!("expected actuated cycle, got {:?}", record.outcome);
    };
    assert_eq!(snapshot.features(), REFERENCE);
    assert!(intent.fan_on && !intent.water_pump_on);

    let (_, line) = LogEventSink::new(LogFormat::Text).render(&LoopEvent::Cycle(record.clone()));
    assert!(line.contains("T=31.0\u{00b0}C RH=40.0% WL=90.0% N=130.0 P=90.0 K=100.0"), "{line}");
    assert!(line.contains("fan=ON pump=OFF"), "{line}");
}

// ── Scenario B: water level unavailable ───────────────────────

#[test]
fn scenario_b_missing_water_level_skips_cycle() {
    let mut cl = ControlLoop::new(
        MockSensors::without(SensorChannel::WaterLevel),
        MockActuators::new(),
        RecordingSink::new(),
        Duration::from_millis(1),
    );
    cl.start(DecisionEngine::new(FixedClassifier(&[true, false])))
        .unwrap();
    cl.run_cycle().unwrap();

    assert!(cl.actuators().calls.is_empty());
    let record = cl.sink().cycles().next().unwrap();
    assert!(matches!(record.outcome, CycleOutcome::InvalidSnapshot(_)));

    let (_, line) = LogEventSink::new(LogFormat::Text).render(&LoopEvent::Cycle(record.clone()));
    assert!(line.contains("invalid snapshot (unavailable: water_level)"), "{line}");
}

// ── Scenario C: nonexistent model path ────────────────────────

#[test]
fn scenario_c_missing_model_never_runs() {
    let mut cl = ControlLoop::new(
        MockSensors::reference(),
        MockActuators::new(),
        RecordingSink::new(),
        Duration::from_millis(1),
    );
    let err = cl
        .start(DecisionEngine::load(Path::new(
            "/nonexistent/models/rf_greenhouse_model.json",
        )))
        .unwrap_err();

    assert!(matches!(err, StartupError::Model(ModelError::NotFound(_))));
    assert_eq!(cl.state(), LoopState::Idle);
    assert_eq!(
        cl.run_blocking(&ShutdownToken::new()).unwrap_err(),
        LoopError::NotRunning(LoopState::Idle)
    );
    assert!(cl.actuators().calls.is_empty());
    assert_eq!(cl.sensors().reads, 0);
    assert!(matches!(
        cl.sink().events.as_slice(),
        [LoopEvent::StartupFailed(_)]
    ));
}

// ── Full stack over a model file ──────────────────────────────

fn model_file(json: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(json.as_bytes()).unwrap();
    f
}

#[test]
fn simulated_stack_with_forest_model() {
    let model = model_file(STUMP_FOREST);
    let mut config = SystemConfig::default();
    config.model_path = model.path().to_path_buf();
    config.cycle_interval_ms = 100;
    config.max_cycles = Some(2);

    let mut cl = ControlLoop::from_config(
        SimulatedSensors::new(&config.simulation),
        SimulatedActuators::new(),
        RecordingSink::new(),
        &config,
    );
    cl.start(DecisionEngine::load(&config.model_path)).unwrap();
    assert_eq!(cl.engine().unwrap().model_version(), "stump-forest");

    let stats = cl.run_blocking(&ShutdownToken::new()).unwrap();
    assert_eq!(stats.cycles, 2);
    assert_eq!(stats.actuated, 2);
    // 31 °C > 30 → fan on; 40 % RH <= 50 → pump on.
    assert!(cl.actuators().fan_on());
    assert!(cl.actuators().water_pump_on());
    assert_eq!(cl.actuators().commands(), 4);
}

#[test]
fn reordered_model_columns_fail_startup() {
    let reordered = STUMP_FOREST.replace(
        r#"["tempreature", "humidity""#,
        r#"["humidity", "tempreature""#,
    );
    let model = model_file(&reordered);
    let err = DecisionEngine::load(model.path()).unwrap_err();
    assert!(matches!(err, ModelError::FeatureMismatch { index: 0, .. }));
}

#[test]
fn truncated_model_file_fails_startup() {
    let model = model_file(&STUMP_FOREST[..STUMP_FOREST.len() / 2]);
    assert!(matches!(
        DecisionEngine::load(model.path()).unwrap_err(),
        ModelError::Malformed(_)
    ));
}

#[test]
fn bundled_model_turns_fan_on_for_reference_readings() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(SystemConfig::default().model_path);
    let engine = DecisionEngine::load(&path).unwrap();
    let snapshot = assemble(&mut SimulatedSensors::default()).unwrap();
    let intent = engine.decide(&snapshot).unwrap();
    assert!(intent.fan_on, "31 °C should ventilate");
    assert!(!intent.water_pump_on, "90 % reservoir, 40 % RH should not irrigate");
}
