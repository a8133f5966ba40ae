//! Tree-ensemble model artifact: loader, validator and evaluator.
//!
//! The offline trainer exports a multi-output classifier (one head per
//! label) as a versioned JSON document:
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "model_version": "rf-2024.06",
//!   "kind": "forest",                       // or "boosted"
//!   "features": ["temperature", "humidity", "water_level", "N", "P", "K"],
//!   "heads": [
//!     { "label": "Fan_actuator_ON",        "trees": [ { "nodes": [...] } ] },
//!     { "label": "Watering_plant_pump_ON", "trees": [ ... ] }
//!   ]
//! }
//! ```
//!
//! Each tree is a flat node array rooted at index 0.  A node is either
//! `{"split": {"feature", "threshold", "left", "right"}}` or
//! `{"leaf": {"value"}}`.  Child indices must point strictly forward,
//! which makes every traversal terminate.
//!
//! ## Ensemble semantics
//!
//! | kind      | split goes left when | leaf value           | head fires when          |
//! |-----------|----------------------|----------------------|--------------------------|
//! | `forest`  | `x <= threshold`     | P(positive class)    | mean of leaves > 0.5     |
//! | `boosted` | `x < threshold`      | additive margin      | base_score + Σ leaves > 0 |

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, MAX_OUTPUTS, Prediction};
use crate::error::{InferenceError, ModelError};

/// Artifact format this build evaluates.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Serialized form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleKind {
    /// Bagged trees with probability leaves (random forest).
    Forest,
    /// Gradient-boosted trees with margin leaves.
    Boosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub label: String,
    /// Initial margin for boosted heads.  Ignored for forests.
    #[serde(default)]
    pub base_score: f32,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub format_version: u32,
    #[serde(default)]
    pub model_version: String,
    pub kind: EnsembleKind,
    pub features: Vec<String>,
    pub heads: Vec<Head>,
}

// ---------------------------------------------------------------------------
// Validated classifier
// ---------------------------------------------------------------------------

/// A structurally validated ensemble, immutable after load.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    artifact: ForestArtifact,
}

impl ForestClassifier {
    /// Read and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ModelError::NotFound(path.to_path_buf()),
            _ => ModelError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let classifier = Self::from_json_slice(&bytes)?;
        info!(
            "Loaded {:?} model '{}' from {} ({} heads, {} trees)",
            classifier.artifact.kind,
            classifier.artifact.model_version,
            path.display(),
            classifier.artifact.heads.len(),
            classifier.tree_count()
        );
        Ok(classifier)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        validate(&artifact)?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ForestArtifact {
        &self.artifact
    }

    pub fn kind(&self) -> EnsembleKind {
        self.artifact.kind
    }

    /// Output labels in head order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.artifact.heads.iter().map(|h| h.label.as_str())
    }

    /// Total number of trees across all heads.
    pub fn tree_count(&self) -> usize {
        self.artifact.heads.iter().map(|h| h.trees.len()).sum()
    }

    fn head_fires(&self, head: &Head, x: &[f32]) -> bool {
        let kind = self.artifact.kind;
        let sum: f32 = head.trees.iter().map(|t| t.evaluate(x, kind)).sum();
        match kind {
            EnsembleKind::Forest => sum / head.trees.len() as f32 > 0.5,
            EnsembleKind::Boosted => head.base_score + sum > 0.0,
        }
    }
}

impl Tree {
    /// Walk from the root to a leaf.  Only call on validated trees with
    /// `x.len()` equal to the model arity.
    fn evaluate(&self, x: &[f32], kind: EnsembleKind) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let go_left = match kind {
                        EnsembleKind::Forest => x[feature] <= threshold,
                        EnsembleKind::Boosted => x[feature] < threshold,
                    };
                    idx = if go_left { left } else { right };
                }
            }
        }
    }
}

impl Classifier for ForestClassifier {
    fn input_arity(&self) -> usize {
        self.artifact.features.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.artifact.features)
    }

    fn output_arity(&self) -> Option<usize> {
        Some(self.artifact.heads.len())
    }

    fn version(&self) -> &str {
        &self.artifact.model_version
    }

    fn predict(&self, features: &[f32]) -> Result<Prediction, InferenceError> {
        let arity = self.input_arity();
        if features.len() != arity {
            return Err(InferenceError::InputArity {
                expected: arity,
                found: features.len(),
            });
        }
        if let Some(idx) = features.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::NonFiniteFeature(idx));
        }

        let mut out = Prediction::new();
        for head in &self.artifact.heads {
            out.push(self.head_fires(head, features))
                .map_err(|_| InferenceError::Backend("too many output heads"))?;
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Structural validation
// ---------------------------------------------------------------------------

fn validate(a: &ForestArtifact) -> Result<(), ModelError> {
    if a.format_version != FORMAT_VERSION {
        return Err(ModelError::UnsupportedVersion(a.format_version));
    }
    let arity = a.features.len();
    if arity == 0 {
        return Err(ModelError::Invalid("no feature columns".into()));
    }
    if a.heads.is_empty() {
        return Err(ModelError::Invalid("no output heads".into()));
    }
    if a.heads.len() > MAX_OUTPUTS {
        return Err(ModelError::Invalid(format!(
            "{} output heads, at most {MAX_OUTPUTS} supported",
            a.heads.len()
        )));
    }

    for head in &a.heads {
        if head.trees.is_empty() {
            return Err(ModelError::Invalid(format!("head '{}' has no trees", head.label)));
        }
        if !head.base_score.is_finite() {
            return Err(ModelError::Invalid(format!(
                "head '{}' base_score is not finite",
                head.label
            )));
        }
        for (t, tree) in head.trees.iter().enumerate() {
            validate_tree(tree, arity).map_err(|msg| {
                ModelError::Invalid(format!("head '{}' tree {t}: {msg}", head.label))
            })?;
        }
    }
    Ok(())
}

fn validate_tree(tree: &Tree, arity: usize) -> Result<(), String> {
    let len = tree.nodes.len();
    if len == 0 {
        return Err("empty tree".into());
    }
    for (i, node) in tree.nodes.iter().enumerate() {
        match *node {
            Node::Leaf { value } => {
                if !value.is_finite() {
                    return Err(format!("node {i}: leaf value is not finite"));
                }
            }
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= arity {
                    return Err(format!("node {i}: feature {feature} out of range"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {i}: threshold is not finite"));
                }
                for child in [left, right] {
                    if child <= i || child >= len {
                        return Err(format!("node {i}: child {child} out of order"));
                    }
                }
            }
        }
    }
    Ok(())
}
