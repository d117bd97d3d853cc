//! Feature Vector - Core data structure for model input
//!
//! Values are ordered exactly as `FEATURE_LAYOUT`.

use serde::{Deserialize, Serialize};
use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT, FUEL_OFFSET};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from a slice; `None` when the length is not FEATURE_COUNT
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let values: [f64; FEATURE_COUNT] = values.try_into().ok()?;
        Some(Self { values })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// The four one-hot fuel slots (diesel, electric, hybrid, petrol)
    pub fn fuel_slots(&self) -> &[f64] {
        &self.values[FUEL_OFFSET..]
    }

    /// Named values, for debug logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        let named: serde_json::Map<String, serde_json::Value> = FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();
        serde_json::Value::Object(named)
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}
