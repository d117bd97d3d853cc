//! Vehicle Type Classification API server
//!
//! Loads the persisted model (or fits a bootstrap model), then serves the
//! prediction API until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vehicle_classifier::{
    create_router, service::PredictionService, training::load_or_bootstrap, AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "vehicle_classifier=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Vehicle Classification API starting...");
    tracing::info!("Model path: {}", config.model_path.display());
    if config.allows_any_origin() {
        tracing::warn!("CORS allows any origin");
    } else {
        tracing::info!("CORS origins: {:?}", config.allowed_origins);
    }

    // Load or train the model before accepting requests
    let model_path = config.model_path.clone();
    let options = config.bootstrap_options();
    let loaded = tokio::task::spawn_blocking(move || load_or_bootstrap(&model_path, &options))
        .await
        .context("Model loading task panicked")?
        .context("Failed to load or train a model")?;

    tracing::info!("Model ready (source: {})", loaded.source.as_str());

    let state = AppState {
        service: Arc::new(PredictionService::from_loaded(loaded)),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid HOST {:?}", config.host))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
