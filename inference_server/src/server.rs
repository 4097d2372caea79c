use crate::engine::InferenceEngine;
use crate::error::{ApiError, ApiResult};
use crate::misc::HealthResponse;
use anyhow::Result;
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderValue,
    response::Json,
    routing::{get, post},
};
use data_ingestion::config::{AppConfig, ServerConfig};
use data_ingestion::{PredictRequest, PredictResponse};
use log::{error, info};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

#[derive(Clone)]
struct AppState {
    engine: Arc<InferenceEngine>,
}

/// POST /predict trains on the posted closes and returns the next close.
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;

    info!(
        "Forecast request: symbol={} days={} closes={}",
        request.symbol,
        request.days,
        request.close_prices.len()
    );

    let symbol = request.symbol.clone();
    let engine = state.engine.clone();

    // Training is CPU-bound; keep it off the async workers.
    let forecast = tokio::task::spawn_blocking(move || engine.forecast(&request))
        .await
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("Forecast task failed")))??;

    Ok(Json(PredictResponse {
        symbol,
        predicted_next_close: forecast.value,
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn router(engine: InferenceEngine, config: &ServerConfig) -> Result<Router> {
    let state = AppState {
        engine: Arc::new(engine),
    };

    let app = Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(cors_layer(&config.allowed_origin)?)
        .with_state(state);

    Ok(app)
}

pub struct Server {
    config: AppConfig,
}

impl Server {
    pub fn init(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let engine = InferenceEngine::from_config(&self.config);
        let server = &self.config.server;
        let app = router(engine, server)?;

        let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port)).await?;
        info!("HTTP server running on {}", listener.local_addr()?);
        info!("CORS origin: {}", server.allowed_origin);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, initiating graceful shutdown");
}
