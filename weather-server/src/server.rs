use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use weather_core::{AggregatedResponse, Config, Coordinates, OpenWeatherProvider, WeatherSource};

pub type SharedSource = Arc<dyn WeatherSource>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

pub fn create_router(source: SharedSource) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather/lat/:latitude/long/:longitude", get(weather))
        .with_state(source)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Always answers 200; upstream failures and undecodable path segments are
/// reported inside the body.
async fn weather(
    coordinates: Result<Path<Coordinates>, PathRejection>,
    State(source): State<SharedSource>,
) -> Json<AggregatedResponse> {
    let coordinates = match coordinates {
        Ok(Path(coordinates)) => coordinates,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected weather path");
            return Json(AggregatedResponse::Error {
                error: rejection.body_text(),
            });
        }
    };

    Json(weather_core::aggregate(source.as_ref(), &coordinates).await)
}

pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let provider = OpenWeatherProvider::from_config(config)?;
    let app = create_router(Arc::new(provider));

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        upstream = %config.base_url,
        "weather server listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    tracing::info!("weather server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
