//! Unified error types for the greenhouse controller.
//!
//! Errors fall into three groups that map directly onto how the control
//! loop reacts to them:
//!
//! - **Startup** ([`ModelError`], [`StartupError`]): the loop never enters
//!   `Running`; the process exits non-zero.
//! - **Per-cycle** ([`SnapshotError`], [`InferenceError`],
//!   [`ActuatorFault`]): logged and isolated to the current cycle.
//! - **Defensive** ([`LoopError`]): anything outside the per-cycle
//!   handling.  The loop stops and the process exits non-zero.

use core::fmt;
use std::path::PathBuf;

use crate::app::lifecycle::LoopState;
use crate::app::snapshot::SensorChannel;
use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Snapshot assembly
// ---------------------------------------------------------------------------

/// Channels that were unavailable while assembling one snapshot.
pub type MissingChannels = heapless::Vec<SensorChannel, { SensorChannel::COUNT }>;

/// A snapshot could not be assembled because at least one read failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotError {
    pub missing: MissingChannels,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unavailable:")?;
        for (i, ch) in self.missing.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{ch}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Inference (decide-time, recoverable)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceError {
    /// Feature vector length differs from the classifier's input arity.
    InputArity { expected: usize, found: usize },
    /// A feature value is NaN or infinite.
    NonFiniteFeature(usize),
    /// The classifier produced the wrong number of outputs.
    OutputArity { expected: usize, found: usize },
    /// The classifier failed internally.
    Backend(&'static str),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputArity { expected, found } => {
                write!(f, "input arity {found}, classifier expects {expected}")
            }
            Self::NonFiniteFeature(idx) => write!(f, "feature {idx} is not finite"),
            Self::OutputArity { expected, found } => {
                write!(f, "classifier returned {found} outputs, expected {expected}")
            }
            Self::Backend(msg) => write!(f, "classifier failure: {msg}"),
        }
    }
}

impl std::error::Error for InferenceError {}

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Which actuator refused a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorFault {
    Fan,
    WaterPump,
}

impl fmt::Display for ActuatorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fan => write!(f, "fan command not applied"),
            Self::WaterPump => write!(f, "water pump command not applied"),
        }
    }
}

// ---------------------------------------------------------------------------
// Model artifact (startup, fatal)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ModelError {
    /// No file at the configured path.
    NotFound(PathBuf),
    /// The file exists but could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file is not a well-formed artifact document.
    Malformed(serde_json::Error),
    /// The artifact declares a format version this build cannot evaluate.
    UnsupportedVersion(u32),
    /// The artifact parsed but its structure is invalid.
    Invalid(String),
    /// Classifier input arity does not match the fixed feature order.
    ArityMismatch { expected: usize, found: usize },
    /// A named feature column is out of order or unknown.
    FeatureMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "model artifact not found: {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "cannot read model artifact {}: {source}", path.display())
            }
            Self::Malformed(e) => write!(f, "malformed model artifact: {e}"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported artifact format version {v}"),
            Self::Invalid(msg) => write!(f, "invalid model artifact: {msg}"),
            Self::ArityMismatch { expected, found } => {
                write!(f, "model expects {found} features, controller provides {expected}")
            }
            Self::FeatureMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "feature column {index} is '{found}', expected '{expected}'"
            ),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e)
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Anything that keeps the loop from leaving `Idle`.
#[derive(Debug)]
pub enum StartupError {
    Config(ConfigError),
    Model(ModelError),
    /// `start` was called on a loop that is not `Idle`.
    AlreadyStarted(LoopState),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Model(e) => write!(f, "decision engine: {e}"),
            Self::AlreadyStarted(state) => write!(f, "loop already left Idle (now {state:?})"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::AlreadyStarted(_) => None,
        }
    }
}

impl From<ModelError> for StartupError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Defensive loop errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopError {
    /// A cycle was requested while the loop is not `Running`.
    NotRunning(LoopState),
    /// `Running` without a decision engine (internal invariant broken).
    EngineMissing,
    /// A port or classifier panicked inside a cycle.
    CyclePanicked(String),
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning(state) => write!(f, "control loop is not running (state {state:?})"),
            Self::EngineMissing => write!(f, "running without a decision engine"),
            Self::CyclePanicked(msg) => write!(f, "cycle panicked: {msg}"),
        }
    }
}

impl std::error::Error for LoopError {}
