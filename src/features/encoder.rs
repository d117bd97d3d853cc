//! Feature Encoder
//!
//! Turns a vehicle description into the fixed-order `FeatureVector`.
//! Two entry points share the same encoding:
//! - `encode_payload` for raw JSON request bodies
//! - `encode` for typed `VehicleAttributes` (synthetic training data)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::layout::{FEATURE_COUNT, FUEL_OFFSET};
use super::vector::FeatureVector;

/// Request keys, in the order they are validated
pub const REQUIRED_FIELDS: [&str; 9] = [
    "length",
    "height",
    "width",
    "weight",
    "engine_power",
    "top_speed",
    "axle_count",
    "seats",
    "fuel_type",
];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl EncodeError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EncodeError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// FUEL TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Diesel,
    Electric,
    Hybrid,
    Petrol,
}

impl FuelType {
    /// One-hot slot order
    pub const ALL: [FuelType; 4] = [
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
        FuelType::Petrol,
    ];

    /// Case-insensitive match; the value is lower-cased, not trimmed
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "diesel" => Some(FuelType::Diesel),
            "electric" => Some(FuelType::Electric),
            "hybrid" => Some(FuelType::Hybrid),
            "petrol" => Some(FuelType::Petrol),
            _ => None,
        }
    }

    pub fn slot(self) -> usize {
        match self {
            FuelType::Diesel => 0,
            FuelType::Electric => 1,
            FuelType::Hybrid => 2,
            FuelType::Petrol => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Diesel => "diesel",
            FuelType::Electric => "electric",
            FuelType::Hybrid => "hybrid",
            FuelType::Petrol => "petrol",
        }
    }
}

// ============================================================================
// VEHICLE ATTRIBUTES
// ============================================================================

/// Physical description of a vehicle.
///
/// `fuel_type` keeps the caller's raw string: an unrecognised value is not
/// an error, it encodes to an all-zero fuel block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleAttributes {
    pub length: f64,
    pub height: f64,
    pub width: f64,
    pub weight: f64,
    pub engine_power: f64,
    pub top_speed: f64,
    pub axle_count: i64,
    pub seats: i64,
    pub fuel_type: String,
}

impl VehicleAttributes {
    /// Parse a raw JSON object.
    ///
    /// Numbers may arrive as JSON numbers or numeric strings. Integer fields
    /// truncate JSON floats toward zero but reject non-integer strings.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, EncodeError> {
        Ok(Self {
            length: read_float(payload, "length")?,
            height: read_float(payload, "height")?,
            width: read_float(payload, "width")?,
            weight: read_float(payload, "weight")?,
            engine_power: read_float(payload, "engine_power")?,
            top_speed: read_float(payload, "top_speed")?,
            axle_count: read_integer(payload, "axle_count")?,
            seats: read_integer(payload, "seats")?,
            fuel_type: read_string(payload, "fuel_type")?,
        })
    }

    pub fn fuel(&self) -> Option<FuelType> {
        FuelType::parse(&self.fuel_type)
    }
}

// ============================================================================
// ENCODING
// ============================================================================

/// Pure, deterministic encoding into the 12-slot layout
pub fn encode(attrs: &VehicleAttributes) -> FeatureVector {
    let mut values = [0.0f64; FEATURE_COUNT];

    values[0] = attrs.length;
    values[1] = attrs.height;
    values[2] = attrs.width;
    values[3] = attrs.weight;
    values[4] = attrs.engine_power;
    values[5] = attrs.top_speed;
    values[6] = attrs.axle_count as f64;
    values[7] = attrs.seats as f64;

    if let Some(fuel) = attrs.fuel() {
        values[FUEL_OFFSET + fuel.slot()] = 1.0;
    }

    FeatureVector::from_values(values)
}

pub fn encode_payload(payload: &Map<String, Value>) -> Result<FeatureVector, EncodeError> {
    VehicleAttributes::from_payload(payload).map(|attrs| encode(&attrs))
}

/// First required key absent from the payload, in `REQUIRED_FIELDS` order
pub fn first_missing_field(payload: &Map<String, Value>) -> Option<&'static str> {
    REQUIRED_FIELDS.iter().copied().find(|field| !payload.contains_key(*field))
}

// ============================================================================
// FIELD READERS
// ============================================================================

fn field<'a>(payload: &'a Map<String, Value>, name: &str) -> Result<&'a Value, EncodeError> {
    payload
        .get(name)
        .ok_or_else(|| EncodeError::MissingField(name.to_string()))
}

fn read_float(payload: &Map<String, Value>, name: &str) -> Result<f64, EncodeError> {
    let value = field(payload, name)?;

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(EncodeError::invalid(name, "value must be a finite number")),
        None => Err(EncodeError::invalid(
            name,
            format!("could not convert {} to float", describe(value)),
        )),
    }
}

fn read_integer(payload: &Map<String, Value>, name: &str) -> Result<i64, EncodeError> {
    let value = field(payload, name)?;

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        EncodeError::invalid(
            name,
            format!("invalid literal for int(): {}", describe(value)),
        )
    })
}

fn read_string(payload: &Map<String, Value>, name: &str) -> Result<String, EncodeError> {
    match field(payload, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(EncodeError::invalid(
            name,
            format!("expected a string, got {}", describe(other)),
        )),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string '{}'", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
