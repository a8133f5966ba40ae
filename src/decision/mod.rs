//! Decision engine — snapshot in, actuation intent out.
//!
//! ```text
//!  SensorSnapshot ──▶ FeatureVector ──▶ Classifier::predict ──▶ [fan, pump] ──▶ ActuationIntent
//!                    (fixed order)      (opaque, injected)      (exactly 2)
//! ```
//!
//! The engine validates the classifier's input schema once, at
//! construction.  After that `decide` is pure: it holds no mutable state
//! and never retries.  A failed or malformed inference is reported to the
//! caller, which skips actuation for that cycle.

pub mod classifier;
pub mod forest;

use std::path::Path;

use crate::app::snapshot::{ActuationIntent, SensorChannel, SensorSnapshot};
use crate::error::{InferenceError, ModelError};

use classifier::Classifier;
use forest::ForestClassifier;

/// Column order the classifier was trained on.
pub const FEATURE_ORDER: [SensorChannel; SensorChannel::COUNT] = SensorChannel::ALL;

/// Outputs the engine decodes: `[fan_on, water_pump_on]`.
pub const OUTPUT_ARITY: usize = 2;

/// Wraps a loaded classifier behind the fixed feature/output contract.
#[derive(Debug)]
pub struct DecisionEngine<C = ForestClassifier> {
    classifier: C,
}

impl DecisionEngine<ForestClassifier> {
    /// Load the tree-ensemble artifact at `path` and check its schema.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::new(ForestClassifier::load(path)?)
    }
}

impl<C: Classifier> DecisionEngine<C> {
    /// Accept `classifier` if its input schema matches [`FEATURE_ORDER`].
    pub fn new(classifier: C) -> Result<Self, ModelError> {
        check_schema(&classifier)?;
        Ok(Self { classifier })
    }

    pub fn decide(&self, snapshot: &SensorSnapshot) -> Result<ActuationIntent, InferenceError> {
        let features = snapshot.features();
        let prediction = self.classifier.predict(&features)?;
        match prediction.as_slice() {
            &[fan_on, water_pump_on] => Ok(ActuationIntent {
                fan_on,
                water_pump_on,
            }),
            other => Err(InferenceError::OutputArity {
                expected: OUTPUT_ARITY,
                found: other.len(),
            }),
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn model_version(&self) -> &str {
        self.classifier.version()
    }
}

fn check_schema(c: &impl Classifier) -> Result<(), ModelError> {
    let found = c.input_arity();
    if found != FEATURE_ORDER.len() {
        return Err(ModelError::ArityMismatch {
            expected: FEATURE_ORDER.len(),
            found,
        });
    }

    if let Some(names) = c.feature_names() {
        for (index, (channel, name)) in FEATURE_ORDER.iter().zip(names).enumerate() {
            if !column_matches(*channel, name) {
                return Err(ModelError::FeatureMismatch {
                    index,
                    expected: channel.column(),
                    found: name.clone(),
                });
            }
        }
    }

    if let Some(outputs) = c.output_arity() {
        if outputs != OUTPUT_ARITY {
            return Err(ModelError::Invalid(format!(
                "model has {outputs} outputs, expected {OUTPUT_ARITY} (fan, water pump)"
            )));
        }
    }
    Ok(())
}

/// Training data spells the first column `tempreature`; accept it.
fn column_matches(channel: SensorChannel, name: &str) -> bool {
    name.eq_ignore_ascii_case(channel.column())
        || (channel == SensorChannel::Temperature && name.eq_ignore_ascii_case("tempreature"))
}
