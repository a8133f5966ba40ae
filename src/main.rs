//! Greenhouse controller — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SimulatedSensors   SimulatedActuators   LogEventSink        │
//! │  (SensorPort)       (ActuatorPort)       (EventSink)         │
//! │  JsonConfigFile     ctrlc handler ──▶ ShutdownToken          │
//! │  (ConfigPort)                                                │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │   ControlLoop  ──▶  DecisionEngine(ForestClassifier) │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exit status: 0 graceful stop, 1 fatal stop while running (or a failed
//! `predict` inference), 2 startup failure (configuration or model).
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use greenhouse::adapters::config_file::JsonConfigFile;
use greenhouse::adapters::log_sink::LogEventSink;
use greenhouse::adapters::simulated::{SimulatedActuators, SimulatedSensors};
use greenhouse::app::control_loop::ControlLoop;
use greenhouse::app::ports::ConfigPort;
use greenhouse::app::shutdown::ShutdownToken;
use greenhouse::app::snapshot::SensorSnapshot;
use greenhouse::config::{LogFormat, SystemConfig};
use greenhouse::decision::DecisionEngine;
use greenhouse::diagnostics;

const EXIT_FATAL: u8 = 1;
const EXIT_STARTUP: u8 = 2;

// ── CLI ───────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "greenhouse", version, about = "Greenhouse fan and irrigation controller")]
struct Cli {
    /// JSON config file (fields not given keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the model artifact path
    #[arg(long, global = true)]
    model: Option<PathBuf>,
    /// Override the pause between cycles, in milliseconds
    #[arg(long, global = true)]
    interval_ms: Option<u32>,
    /// Cycle record format: text or json
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control loop until interrupted (default)
    Run {
        /// Stop gracefully after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Load the model artifact, check its schema and print its metadata
    CheckModel,
    /// Decide once for the given readings and print the intent
    Predict {
        #[arg(long)]
        temperature: f32,
        #[arg(long)]
        humidity: f32,
        #[arg(long)]
        water_level: f32,
        #[arg(long = "n")]
        nitrogen: f32,
        #[arg(long = "p")]
        phosphorus: f32,
        #[arg(long = "k")]
        potassium: f32,
    },
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    diagnostics::install_panic_handler();
    info!("Greenhouse controller v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return ExitCode::from(EXIT_STARTUP);
        }
    };

    match cli.command.unwrap_or(Command::Run { cycles: None }) {
        Command::Run { .. } => run(&config),
        Command::CheckModel => match check_model(&config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{:#}", e);
                ExitCode::from(EXIT_STARTUP)
            }
        },
        Command::Predict {
            temperature,
            humidity,
            water_level,
            nitrogen,
            phosphorus,
            potassium,
        } => predict(
            &config,
            SensorSnapshot {
                temperature_c: temperature,
                humidity_pct: humidity,
                water_level_pct: water_level,
                nitrogen,
                phosphorus,
                potassium,
            },
        ),
    }
}

/// Defaults < config file < `GREENHOUSE_*` environment < CLI flags.
fn load_config(cli: &Cli) -> Result<SystemConfig> {
    let mut config = match &cli.config {
        Some(path) => JsonConfigFile::new(path)
            .load()
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SystemConfig::default(),
    };

    config
        .apply_env(|key| std::env::var(key).ok())
        .context("environment overrides")?;

    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    if let Some(ms) = cli.interval_ms {
        config.cycle_interval_ms = ms;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(Command::Run {
        cycles: Some(limit),
    }) = &cli.command
    {
        config.max_cycles = Some(*limit);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

// ── Subcommands ───────────────────────────────────────────────

fn run(config: &SystemConfig) -> ExitCode {
    let shutdown = ShutdownToken::new();
    let on_signal = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Termination requested");
        on_signal.request();
    }) {
        warn!("Signal handler not installed ({}); stop with --cycles", e);
    }

    let mut control = ControlLoop::from_config(
        SimulatedSensors::new(&config.simulation),
        SimulatedActuators::new(),
        LogEventSink::new(config.log_format),
        config,
    );

    info!("Loading model from {}", config.model_path.display());
    if let Err(e) = control.start(DecisionEngine::load(&config.model_path)) {
        error!("Startup failed: {}", e);
        return ExitCode::from(EXIT_STARTUP);
    }

    match control.run_blocking(&shutdown) {
        Ok(stats) => {
            info!("Shut down cleanly after {} cycles", stats.cycles);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Stopped on fatal error: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn check_model(config: &SystemConfig) -> Result<()> {
    let engine = DecisionEngine::load(&config.model_path)
        .with_context(|| format!("model {}", config.model_path.display()))?;
    let forest = engine.classifier();
    let artifact = forest.artifact();

    println!("path:      {}", config.model_path.display());
    println!("version:   {}", engine.model_version());
    println!("kind:      {:?}", forest.kind());
    println!("features:  {}", artifact.features.join(", "));
    for head in &artifact.heads {
        println!("output:    {} ({} trees)", head.label, head.trees.len());
    }
    println!("trees:     {}", forest.tree_count());
    Ok(())
}

fn predict(config: &SystemConfig, snapshot: SensorSnapshot) -> ExitCode {
    let engine = match DecisionEngine::load(&config.model_path) {
        Ok(engine) => engine,
        Err(e) => {
            error!("model {}: {}", config.model_path.display(), e);
            return ExitCode::from(EXIT_STARTUP);
        }
    };
    match engine.decide(&snapshot) {
        Ok(intent) => {
            println!("{}", intent);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("inference failed: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
