//! REST API routes

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use teslasense_core::SensorReading;
use thiserror::Error;
use tower_http::cors::CorsLayer;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/sensors", get(list_sensors))
        .route("/api/sensors/:uniq_name", get(get_sensor))
        .route("/api/sensors/:uniq_name/update", post(update_sensor))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("sensor {0:?} not found")]
    SensorNotFound(String),

    #[error(transparent)]
    Controller(#[from] teslasense_core::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::SensorNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Controller(_) => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

// === Sensor Endpoints ===

async fn list_sensors(State(state): State<AppState>) -> Json<Vec<SensorReading>> {
    Json(state.readings().await)
}

async fn get_sensor(
    State(state): State<AppState>,
    Path(uniq_name): Path<String>,
) -> Result<Json<SensorReading>, ApiError> {
    let sensor = state
        .find_sensor(&uniq_name)
        .await
        .ok_or_else(|| ApiError::SensorNotFound(uniq_name.clone()))?;
    let reading = sensor.read().await.snapshot();
    Ok(Json(reading))
}

#[derive(Debug, Default, Deserialize)]
struct UpdateRequest {
    #[serde(default)]
    wake_if_asleep: bool,
    #[serde(default)]
    force: bool,
}

async fn update_sensor(
    State(state): State<AppState>,
    Path(uniq_name): Path<String>,
    request: Option<Json<UpdateRequest>>,
) -> Result<Json<SensorReading>, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let sensor = state
        .find_sensor(&uniq_name)
        .await
        .ok_or_else(|| ApiError::SensorNotFound(uniq_name.clone()))?;

    let mut sensor = sensor.write().await;
    sensor.update(request.wake_if_asleep, request.force).await?;
    Ok(Json(sensor.snapshot()))
}
