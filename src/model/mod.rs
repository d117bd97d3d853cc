//! Model Module - Vehicle Classifier
//!
//! Keeps the classifier capability separate from how it is trained and
//! stored, so the serving path only ever sees a `ServingModel`.

pub mod classifier;
pub mod forest;
pub mod store;

// Re-export common types
pub use classifier::{
    Capability, Classifier, ClassifierError, Prediction, ProbabilisticClassifier, ServingModel,
};
pub use forest::{ForestParams, RandomForest};
pub use store::{ModelArtifact, ModelStoreError};
