//! Prediction Service
//!
//! Validates a raw request payload, encodes it and asks the installed model
//! for a label. The model is installed once at startup and never mutated,
//! so the service is shared across requests without locking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::features::{self, EncodeError, LayoutInfo};
use crate::model::{Capability, ServingModel};
use crate::training::{category_of, LoadedModel, ModelSource, VehicleCategory};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid input data: {0}")]
    InvalidInput(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

impl From<EncodeError> for PredictError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::MissingField(field) => PredictError::MissingField(field),
            invalid @ EncodeError::InvalidValue { .. } => PredictError::InvalidInput(invalid.to_string()),
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceLevel::High
        } else if confidence >= 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: Option<f64>,
    pub confidence_level: Option<ConfidenceLevel>,
    pub category: Option<VehicleCategory>,
    /// Request payload, echoed unchanged
    pub input_data: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub feature_count: usize,
    pub features: Vec<String>,
    pub classes: Vec<String>,
    pub capability: Capability,
    pub n_estimators: Option<usize>,
    pub feature_version: u8,
    pub layout_hash: u32,
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Debug)]
struct InstalledModel {
    model: ServingModel,
    source: ModelSource,
    n_estimators: Option<usize>,
}

#[derive(Debug)]
pub struct PredictionService {
    installed: Option<InstalledModel>,
}

impl PredictionService {
    pub fn new(model: ServingModel, source: ModelSource) -> Self {
        Self {
            installed: Some(InstalledModel {
                model,
                source,
                n_estimators: None,
            }),
        }
    }

    /// Install a forest from startup loading; forests always carry probabilities
    pub fn from_loaded(loaded: LoadedModel) -> Self {
        let n_estimators = loaded.model.n_estimators();
        Self {
            installed: Some(InstalledModel {
                model: ServingModel::with_confidence(loaded.model),
                source: loaded.source,
                n_estimators: Some(n_estimators),
            }),
        }
    }

    /// A service with no model; every prediction fails with `ModelUnavailable`
    pub fn unloaded() -> Self {
        Self { installed: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.installed.is_some()
    }

    pub fn source(&self) -> Option<&ModelSource> {
        self.installed.as_ref().map(|m| &m.source)
    }

    /// Predict from an arbitrary JSON body; non-objects are invalid input
    pub fn predict_value(&self, payload: Value) -> Result<PredictionResult, PredictError> {
        self.installed()?;
        match payload {
            Value::Object(map) => self.predict(&map),
            other => Err(PredictError::InvalidInput(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn predict(&self, payload: &Map<String, Value>) -> Result<PredictionResult, PredictError> {
        let installed = self.installed()?;

        if let Some(field) = features::first_missing_field(payload) {
            return Err(PredictError::MissingField(field.to_string()));
        }

        let vector = features::encode_payload(payload)?;
        tracing::debug!("Encoded features: {}", vector.to_log_entry());

        let prediction = installed
            .model
            .predict(&vector)
            .map_err(|e| PredictError::Prediction(e.to_string()))?;

        tracing::debug!(
            "Prediction: {} (confidence {:?})",
            prediction.label,
            prediction.confidence
        );

        Ok(PredictionResult {
            category: category_of(&prediction.label),
            confidence_level: prediction.confidence.map(ConfidenceLevel::from_confidence),
            confidence: prediction.confidence,
            prediction: prediction.label,
            input_data: Value::Object(payload.clone()),
            timestamp: Utc::now(),
        })
    }

    pub fn model_info(&self) -> Result<ModelInfo, PredictError> {
        let installed = self.installed()?;
        let layout = LayoutInfo::current();

        Ok(ModelInfo {
            model_type: installed.model.model_type().to_string(),
            feature_count: layout.feature_count,
            features: layout.feature_names,
            classes: installed.model.classes().to_vec(),
            capability: installed.model.capability(),
            n_estimators: installed.n_estimators,
            feature_version: layout.version,
            layout_hash: layout.hash,
        })
    }

    fn installed(&self) -> Result<&InstalledModel, PredictError> {
        self.installed.as_ref().ok_or(PredictError::ModelUnavailable)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::features::{FeatureVector, FEATURE_COUNT};
    use crate::model::{Classifier, ClassifierError};
    use crate::test_support::{as_map, bike_payload, bootstrap_model, bus_payload};

    fn forest_service() -> PredictionService {
        PredictionService::from_loaded(LoadedModel {
            model: bootstrap_model().clone(),
            source: ModelSource::Bootstrap,
        })
    }

    struct Failing;

    impl Classifier for Failing {
        fn model_type(&self) -> &str {
            "Failing"
        }

        fn classes(&self) -> &[String] {
            &[]
        }

        fn predict(&self, _features: &FeatureVector) -> Result<String, ClassifierError> {
            Err(ClassifierError::Internal("tree walk failed".to_string()))
        }
    }

    struct Fixed(Vec<String>);

    impl Classifier for Fixed {
        fn model_type(&self) -> &str {
            "Fixed"
        }

        fn classes(&self) -> &[String] {
            &self.0
        }

        fn predict(&self, _features: &FeatureVector) -> Result<String, ClassifierError> {
            Ok(self.0[0].clone())
        }
    }

    #[test]
    fn test_bike_prediction() {
        let service = forest_service();
        let result = service.predict(&as_map(bike_payload())).unwrap();

        assert!(bootstrap_model().classes().contains(&result.prediction));
        assert!(result.category.is_some());

        let confidence = result.confidence.unwrap();
        assert!((0.0..=1.0).contains(&confidence));
        assert_eq!(result.confidence_level, Some(ConfidenceLevel::from_confidence(confidence)));
        assert_eq!(result.input_data, bike_payload());
    }

    #[test]
    fn test_bus_prediction() {
        let service = forest_service();
        let result = service.predict(&as_map(bus_payload())).unwrap();

        assert_eq!(result.prediction, "Bus");
        assert_eq!(result.category, Some(VehicleCategory::Bus));
    }

    #[test]
    fn test_missing_seats() {
        let service = forest_service();
        let mut payload = as_map(bike_payload());
        payload.remove("seats");

        assert_eq!(
            service.predict(&payload).unwrap_err(),
            PredictError::MissingField("seats".to_string())
        );
    }

    #[test]
    fn test_first_missing_field_reported() {
        let service = forest_service();
        let mut payload = as_map(bike_payload());
        payload.remove("seats");
        payload.remove("width");

        assert_eq!(
            service.predict(&payload).unwrap_err(),
            PredictError::MissingField("width".to_string())
        );
    }

    #[test]
    fn test_fuel_case_insensitive() {
        let service = forest_service();
        let mut upper = as_map(bus_payload());
        upper.insert("fuel_type".to_string(), json!("DIESEL"));

        let a = service.predict(&as_map(bus_payload())).unwrap();
        let b = service.predict(&upper).unwrap();

        assert_eq!(a.prediction, b.prediction);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn test_invalid_value_is_input_error() {
        let service = forest_service();
        let mut payload = as_map(bike_payload());
        payload.insert("weight".to_string(), json!("heavy"));

        match service.predict(&payload).unwrap_err() {
            PredictError::InvalidInput(msg) => assert!(msg.contains("weight")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_body() {
        let service = forest_service();
        let err = service.predict_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, PredictError::InvalidInput(_)));
    }

    #[test]
    fn test_unloaded_model_checked_first() {
        let service = PredictionService::unloaded();

        assert!(!service.is_loaded());
        assert_eq!(
            service.predict(&Map::new()).unwrap_err(),
            PredictError::ModelUnavailable
        );
        assert_eq!(
            service.predict_value(json!("not an object")).unwrap_err(),
            PredictError::ModelUnavailable
        );
        assert_eq!(service.model_info().unwrap_err(), PredictError::ModelUnavailable);
    }

    #[test]
    fn test_model_failure_wrapped() {
        let service = PredictionService::new(ServingModel::predict_only(Failing), ModelSource::Bootstrap);
        let err = service.predict(&as_map(bike_payload())).unwrap_err();

        assert_eq!(err, PredictError::Prediction("tree walk failed".to_string()));
        assert_eq!(err.to_string(), "Prediction failed: tree walk failed");
    }

    #[test]
    fn test_predict_only_has_no_confidence() {
        let model = Fixed(vec!["Custom_Vehicle".to_string()]);
        let service = PredictionService::new(ServingModel::predict_only(model), ModelSource::Bootstrap);
        let result = service.predict(&as_map(bike_payload())).unwrap();

        assert_eq!(result.prediction, "Custom_Vehicle");
        assert_eq!(result.confidence, None);
        assert_eq!(result.confidence_level, None);
        assert_eq!(result.category, None);

        let body = serde_json::to_value(&result).unwrap();
        assert!(body["confidence"].is_null());
    }

    #[test]
    fn test_model_info() {
        let info = forest_service().model_info().unwrap();

        assert_eq!(info.model_type, "RandomForestClassifier");
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.features[0], "length");
        assert_eq!(info.features[11], "fuel_type_petrol");
        assert!(info.classes.iter().any(|c| c == "Bus"));
        assert!(info.classes.iter().all(|c| category_of(c).is_some()));
        assert_eq!(info.capability, Capability::PredictWithConfidence);
        assert_eq!(info.n_estimators, Some(crate::training::BOOTSTRAP_TREES));
    }

    #[test]
    fn test_confidence_levels() {
        assert_eq!(ConfidenceLevel::from_confidence(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.79), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.6), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.59), ConfidenceLevel::Low);
    }
}
