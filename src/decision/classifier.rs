//! The classifier capability injected into the decision engine.
//!
//! The engine only relies on "fixed-length numeric in, booleans out".
//! Ensemble structure, per-estimator access and training details stay
//! behind this trait.

use crate::error::InferenceError;

/// Upper bound on outputs any classifier may return.  The engine itself
/// requires exactly two; the extra room lets a malformed model be detected
/// and reported instead of truncated.
pub const MAX_OUTPUTS: usize = 8;

/// Binary outputs, in the classifier's label order.
pub type Prediction = heapless::Vec<bool, MAX_OUTPUTS>;

/// A loaded, immutable decision function.
///
/// `predict` must be deterministic and side-effect-free: the same input
/// on the same instance always yields the same output.
pub trait Classifier {
    /// Number of features `predict` expects.
    fn input_arity(&self) -> usize;

    /// Training column names in input order, if the artifact carries them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Number of outputs `predict` returns, if known before inference.
    fn output_arity(&self) -> Option<usize> {
        None
    }

    /// Free-form version string of the artifact, for logging.
    fn version(&self) -> &str {
        "unversioned"
    }

    fn predict(&self, features: &[f32]) -> Result<Prediction, InferenceError>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn input_arity(&self) -> usize {
        (**self).input_arity()
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }

    fn output_arity(&self) -> Option<usize> {
        (**self).output_arity()
    }

    fn version(&self) -> &str {
        (**self).version()
    }

    fn predict(&self, features: &[f32]) -> Result<Prediction, InferenceError> {
        (**self).predict(features)
    }
}
