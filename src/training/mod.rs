//! Training Module - synthetic data, evaluation and the bootstrap model
//!
//! Used by the `train` binary and by the service's startup fallback.

pub mod synthetic;
pub mod split;
pub mod metrics;
pub mod bootstrap;

#[cfg(test)]
mod tests;

use crate::features::FeatureVector;
use crate::model::{Classifier, ClassifierError, ModelStoreError};

pub use bootstrap::{fit_bootstrap_model, BOOTSTRAP_SAMPLES, BOOTSTRAP_TREES, load_or_bootstrap, BootstrapOptions, LoadedModel, ModelSource};
pub use metrics::{accuracy, ClassificationReport};
pub use split::train_test_split;
pub use synthetic::{
    broad_ranges, category_of, generate, generate_rule_based, generate_rule_based_seeded,
    generate_seeded, rule_label, samples_per_class, vehicle_catalog, ClassSpec, LabeledSample,
    ParamRanges, SyntheticError, VehicleCategory,
};

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("Synthetic data error: {0}")]
    Synthetic(#[from] SyntheticError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Model store error: {0}")]
    Store(#[from] ModelStoreError),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),
}

/// Unzip samples into parallel feature/label vectors
pub fn split_xy(samples: &[LabeledSample]) -> (Vec<FeatureVector>, Vec<String>) {
    samples
        .iter()
        .map(|s| (s.features, s.label.clone()))
        .unzip()
}

/// Predict every sample and compare against its label
pub fn evaluate<C: Classifier + ?Sized>(
    model: &C,
    samples: &[LabeledSample],
) -> Result<ClassificationReport, TrainingError> {
    let y_true: Vec<String> = samples.iter().map(|s| s.label.clone()).collect();
    let y_pred = samples
        .iter()
        .map(|s| model.predict(&s.features))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ClassificationReport::new(&y_true, &y_pred))
}
