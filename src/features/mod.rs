//! Features Module - Vehicle Feature Encoding
//!
//! The layout and the encoder are shared by the training tool and the
//! prediction service.

pub mod layout;
pub mod vector;
pub mod encoder;


// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutInfo, layout_hash};
pub use vector::FeatureVector;
pub use encoder::{
    encode, encode_payload, first_missing_field, EncodeError, FuelType, VehicleAttributes,
    REQUIRED_FIELDS,
};
