//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema shared by training and serving**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Persisted models record the version and layout hash they were trained
//! with; a model trained against another layout is rejected at load time.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Dimensions (0-2) ===
    "length",                // 0: meters
    "height",                // 1: meters
    "width",                 // 2: meters

    // === Mass & performance (3-5) ===
    "weight",                // 3: kg
    "engine_power",          // 4: hp
    "top_speed",             // 5: km/h

    // === Configuration (6-7) ===
    "axle_count",            // 6
    "seats",                 // 7

    // === Fuel type one-hot (8-11) ===
    "fuel_type_diesel",      // 8
    "fuel_type_electric",    // 9
    "fuel_type_hybrid",      // 10
    "fuel_type_petrol",      // 11
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 12;

/// Index of the first one-hot fuel slot
pub const FUEL_OFFSET: usize = 8;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and the ordered feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a persisted layout doesn't match the compiled one
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming metadata matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================
