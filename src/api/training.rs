use super::error::{ApiError, OrApiError};
use super::identity::Identity;
use super::AppState;
use crate::domain::entities::training::{PerformanceMetrics, TradeOrder, TrainingScenario, TrainingSession};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
    pub scenario_id: String,
}

#[derive(Debug, Serialize)]
pub struct Hint {
    pub hint: String,
}

pub async fn scenarios(State(state): State<AppState>) -> Json<Vec<TrainingScenario>> {
    Json(state.app.training().scenarios().to_vec())
}

#[instrument(skip(state))]
pub async fn session(State(state): State<AppState>, identity: Identity) -> Result<Json<TrainingSession>, ApiError> {
    state
        .app
        .training()
        .get_session(identity.or_demo())
        .or_api("Failed to load training session")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No training session in progress"))
}

#[instrument(skip(state))]
pub async fn start(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<StartBody>,
) -> Result<(StatusCode, Json<TrainingSession>), ApiError> {
    let session = state
        .app
        .training()
        .start(identity.or_demo(), &body.scenario_id)
        .or_api("Failed to start training")?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(skip(state))]
pub async fn pause(State(state): State<AppState>, identity: Identity) -> Result<Json<TrainingSession>, ApiError> {
    let session = state.app.training().pause(identity.or_demo()).or_api("Failed to pause training")?;
    Ok(Json(session))
}

#[instrument(skip(state))]
pub async fn resume(State(state): State<AppState>, identity: Identity) -> Result<Json<TrainingSession>, ApiError> {
    let session = state.app.training().resume(identity.or_demo()).or_api("Failed to resume training")?;
    Ok(Json(session))
}

#[instrument(skip(state))]
pub async fn reset(State(state): State<AppState>, identity: Identity) -> Result<Json<TrainingSession>, ApiError> {
    let session = state.app.training().reset(identity.or_demo()).or_api("Failed to reset training")?;
    Ok(Json(session))
}

#[instrument(skip(state))]
pub async fn trade(
    State(state): State<AppState>,
    identity: Identity,
    Json(order): Json<TradeOrder>,
) -> Result<Json<TrainingSession>, ApiError> {
    let session = state
        .app
        .training()
        .execute_trade(identity.or_demo(), order)
        .or_api("Failed to execute trade")?;
    Ok(Json(session))
}

#[instrument(skip(state))]
pub async fn hint(State(state): State<AppState>, identity: Identity) -> Result<Json<Hint>, ApiError> {
    let hint = state.app.training().hint(identity.or_demo()).or_api("Failed to build hint")?;
    Ok(Json(Hint { hint }))
}

#[instrument(skip(state))]
pub async fn performance(State(state): State<AppState>, identity: Identity) -> Result<Json<PerformanceMetrics>, ApiError> {
    let metrics = state
        .app
        .training()
        .performance(identity.or_demo())
        .or_api("Failed to compute performance")?;
    Ok(Json(metrics))
}
