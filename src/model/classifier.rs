//! Classifier capabilities
//!
//! The serving core only needs to predict. Probability estimates are an
//! optional capability, decided once when a model is installed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("got {samples} samples but {labels} labels")]
    LabelCountMismatch { samples: usize, labels: usize },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    Internal(String),
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

pub trait Classifier: Send + Sync {
    /// Human-readable model family, e.g. "RandomForestClassifier"
    fn model_type(&self) -> &str;

    /// Known labels, in the order used by `predict_proba`
    fn classes(&self) -> &[String];

    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError>;
}

pub trait ProbabilisticClassifier: Classifier {
    /// One probability per entry of `classes()`
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError>;
}

// ============================================================================
// SERVING MODEL
// ============================================================================

/// What the prediction path can ask of the installed model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    PredictOnly,
    PredictWithConfidence,
}

/// Single shared model instance, immutable after installation
#[derive(Clone)]
pub enum ServingModel {
    PredictOnly(Arc<dyn Classifier>),
    PredictWithConfidence(Arc<dyn ProbabilisticClassifier>),
}

/// Label plus optional max-class probability
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: Option<f64>,
}

impl ServingModel {
    pub fn predict_only<C: Classifier + 'static>(model: C) -> Self {
        ServingModel::PredictOnly(Arc::new(model))
    }

    pub fn with_confidence<C: ProbabilisticClassifier + 'static>(model: C) -> Self {
        ServingModel::PredictWithConfidence(Arc::new(model))
    }

    pub fn capability(&self) -> Capability {
        match self {
            ServingModel::PredictOnly(_) => Capability::PredictOnly,
            ServingModel::PredictWithConfidence(_) => Capability::PredictWithConfidence,
        }
    }

    pub fn model_type(&self) -> &str {
        match self {
            ServingModel::PredictOnly(m) => m.model_type(),
            ServingModel::PredictWithConfidence(m) => m.model_type(),
        }
    }

    pub fn classes(&self) -> &[String] {
        match self {
            ServingModel::PredictOnly(m) => m.classes(),
            ServingModel::PredictWithConfidence(m) => m.classes(),
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        match self {
            ServingModel::PredictOnly(m) => Ok(Prediction {
                label: m.predict(features)?,
                confidence: None,
            }),
            ServingModel::PredictWithConfidence(m) => {
                let label = m.predict(features)?;
                let probabilities = m.predict_proba(features)?;
                Ok(Prediction {
                    label,
                    confidence: max_probability(&probabilities),
                })
            }
        }
    }
}

impl std::fmt::Debug for ServingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServingModel")
            .field("model_type", &self.model_type())
            .field("capability", &self.capability())
            .field("classes", &self.classes().len())
            .finish()
    }
}

/// `None` for an empty distribution
pub fn max_probability(probabilities: &[f64]) -> Option<f64> {
    probabilities.iter().copied().reduce(f64::max)
}
