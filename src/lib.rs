//! Vehicle Type Classification
//!
//! Random forest classifier mapping vehicle attributes to a vehicle type,
//! served over a JSON API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  VEHICLE CLASSIFIER                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  HTTP (Axum) ──► PredictionService ──► FeatureEncoder        │
//! │                         │                                    │
//! │                         ▼                                    │
//! │                  ServingModel (RandomForest)                 │
//! │                         ▲                                    │
//! │  startup: ModelStore::load ──(fail)──► bootstrap fit         │
//! │  offline: `train` = synthetic data ► fit ► evaluate ► save   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod model;
pub mod service;
pub mod training;

use std::sync::Arc;

use axum::{
    http::{header, request, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use service::PredictionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub config: Config,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::status::index))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/model-info", get(handlers::model_info::info))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allows_any_origin() {
        return base.allow_origin(Any);
    }

    let config = config.clone();
    base.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _parts: &request::Parts| {
            origin
                .to_str()
                .map(|origin| config.allows_origin(origin))
                .unwrap_or(false)
        },
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures; the bootstrap forest is fitted once per test binary

    use std::sync::OnceLock;

    use serde_json::{json, Map, Value};

    use crate::model::RandomForest;
    use crate::training::{fit_bootstrap_model, BOOTSTRAP_TREES};

    pub fn bootstrap_model() -> &'static RandomForest {
        static MODEL: OnceLock<RandomForest> = OnceLock::new();
        MODEL.get_or_init(|| fit_bootstrap_model(42, BOOTSTRAP_TREES).expect("bootstrap fit"))
    }

    pub fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    pub fn bike_payload() -> Value {
        json!({
            "length": 2.0, "height": 1.1, "width": 0.8, "weight": 200,
            "engine_power": 150, "top_speed": 180, "axle_count": 2,
            "seats": 1, "fuel_type": "petrol"
        })
    }

    pub fn bus_payload() -> Value {
        json!({
            "length": 12.0, "height": 3.2, "width": 2.5, "weight": 15000,
            "engine_power": 350, "top_speed": 100, "axle_count": 3,
            "seats": 50, "fuel_type": "diesel"
        })
    }
}
