//! Model Store - persisted model artifact
//!
//! Format: pretty JSON `ModelArtifact`, carrying the feature layout version
//! and hash it was trained against. serde_json's `float_roundtrip` keeps
//! split thresholds bit-exact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::layout::{validate_layout, LayoutMismatchError};
use crate::features::{layout_hash, FEATURE_LAYOUT, FEATURE_VERSION};
use super::forest::RandomForest;

/// Bumped when the artifact envelope changes shape
pub const FORMAT_VERSION: u32 = 1;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelStoreError {
    #[error("Model file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("Unsupported model format v{0} (expected v{expected})", expected = FORMAT_VERSION)]
    UnsupportedFormat(u32),

    #[error("Invalid model: {0}")]
    Invalid(String),
}

// ============================================================================
// ARTIFACT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub model: RandomForest,
}

impl ModelArtifact {
    pub fn new(model: RandomForest) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            features: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            trained_at: Utc::now(),
            model,
        }
    }
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// Save model to disk, creating parent directories and overwriting any
/// existing file
pub fn save(model: &RandomForest, path: &Path) -> Result<(), ModelStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(&ModelArtifact::new(model.clone()))?;
    fs::write(path, json)?;

    tracing::info!("Model saved to {}", path.display());
    Ok(())
}

/// Load model from disk with layout validation
pub fn load(path: &Path) -> Result<RandomForest, ModelStoreError> {
    load_artifact(path).map(|artifact| artifact.model)
}

pub fn load_artifact(path: &Path) -> Result<ModelArtifact, ModelStoreError> {
    if !path.exists() {
        return Err(ModelStoreError::NotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let artifact: ModelArtifact = serde_json::from_slice(&data)?;

    if artifact.format_version != FORMAT_VERSION {
        return Err(ModelStoreError::UnsupportedFormat(artifact.format_version));
    }

    validate_layout(artifact.feature_version, artifact.layout_hash)?;

    artifact
        .model
        .validate()
        .map_err(|e| ModelStoreError::Invalid(e.to_string()))?;

    Ok(artifact)
}
