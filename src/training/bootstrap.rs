//! Bootstrap model
//!
//! When no usable model file exists at startup, the service fits a demo
//! forest on rule-labelled synthetic data instead of refusing to start.
//! Its classes are the coarse categories (Bike, Car, SUV, Bus, Truck), not
//! the detailed catalog classes the `train` tool produces.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::forest::{ForestParams, RandomForest};
use crate::model::store::{self, ModelStoreError};
use super::synthetic::generate_rule_based_seeded;
use super::{split_xy, TrainingError};

pub const BOOTSTRAP_SAMPLES: usize = 1000;

pub const BOOTSTRAP_TREES: usize = 100;

pub fn bootstrap_params(seed: u64, n_estimators: usize) -> ForestParams {
    ForestParams {
        n_estimators,
        seed,
        ..ForestParams::default()
    }
}

/// Fit a forest on `BOOTSTRAP_SAMPLES` rule-labelled samples
pub fn fit_bootstrap_model(seed: u64, n_estimators: usize) -> Result<RandomForest, TrainingError> {
    let samples = generate_rule_based_seeded(BOOTSTRAP_SAMPLES, seed)?;
    let (x, y) = split_xy(&samples);

    tracing::info!(
        "Training bootstrap model on {} rule-labelled synthetic samples",
        samples.len()
    );

    Ok(RandomForest::fit(&x, &y, bootstrap_params(seed, n_estimators))?)
}

// ============================================================================
// LOAD OR BOOTSTRAP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ModelSource {
    File(PathBuf),
    Bootstrap,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::File(_) => "file",
            ModelSource::Bootstrap => "bootstrap",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: RandomForest,
    pub source: ModelSource,
}

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub seed: u64,
    pub n_estimators: usize,
    /// Write the bootstrap model to the model path
    pub persist: bool,
}

/// Load the persisted model, falling back to a bootstrap fit on any load
/// failure. Fails only if the bootstrap fit itself fails.
pub fn load_or_bootstrap(path: &Path, options: &BootstrapOptions) -> Result<LoadedModel, TrainingError> {
    match store::load(path) {
        Ok(model) => {
            tracing::info!("Model loaded successfully from {}", path.display());
            tracing::info!("Model classes: {:?}", crate::model::Classifier::classes(&model));
            return Ok(LoadedModel {
                model,
                source: ModelSource::File(path.to_path_buf()),
            });
        }
        Err(ModelStoreError::NotFound(_)) => {
            tracing::warn!("Model file not found at {}, training bootstrap model", path.display());
        }
        Err(e) => {
            tracing::warn!("Error loading model ({}), training bootstrap model", e);
        }
    }

    let model = fit_bootstrap_model(options.seed, options.n_estimators)?;

    if options.persist {
        if let Err(e) = store::save(&model, path) {
            tracing::warn!("Failed to save bootstrap model: {}", e);
        }
    }

    Ok(LoadedModel {
        model,
        source: ModelSource::Bootstrap,
    })
}
