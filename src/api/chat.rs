use super::error::{ApiError, OrApiError};
use super::identity::Identity;
use super::AppState;
use crate::application::ai_service::DEFAULT_INSIGHT_LIMIT;
use crate::domain::entities::chat::{ChatReply, ChatRequest, LearningSession, NewTradingInsight, TradingInsight};
use crate::domain::values::chat_mode::ChatMode;
use crate::domain::values::persona::{Persona, PERSONAS};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub message: String,
    #[serde(default)]
    pub mode: ChatMode,
}

#[derive(Debug, Serialize)]
pub struct Generated {
    pub response: String,
}

#[instrument(skip(state, request))]
pub async fn chat(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state
        .app
        .chat(identity.0.as_deref(), request)
        .await
        .or_api("Failed to process message")?;

    if let Some(data) = &reply.learning_data {
        let tracked = state
            .app
            .ai()
            .update_learning_progress(identity.or_demo(), &data.topic, &data.concepts);
        if let Err(e) = tracked {
            warn!(error = %e, "failed to track learning session");
        }
    }
    Ok(Json(reply))
}

/// One-shot completion without history or persona.
#[instrument(skip(state, body))]
pub async fn generate(State(state): State<AppState>, Json(body): Json<GenerateBody>) -> Result<Json<Generated>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }
    let response = state
        .app
        .ai()
        .generate_response(&body.message, body.mode)
        .await
        .or_api("Failed to generate response")?;
    Ok(Json(Generated { response }))
}

#[instrument(skip(state))]
pub async fn learning_sessions(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<LearningSession>>, ApiError> {
    let sessions = state
        .app
        .ai()
        .get_learning_progress(identity.or_demo())
        .or_api("Failed to load learning sessions")?;
    Ok(Json(sessions))
}

#[instrument(skip(state))]
pub async fn recent_insights(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TradingInsight>>, ApiError> {
    let insights = state
        .app
        .ai()
        .get_recent_insights(query.limit.unwrap_or(DEFAULT_INSIGHT_LIMIT))
        .or_api("Failed to load insights")?;
    Ok(Json(insights))
}

#[instrument(skip(state))]
pub async fn add_insight(
    State(state): State<AppState>,
    Json(insight): Json<NewTradingInsight>,
) -> Result<(StatusCode, Json<TradingInsight>), ApiError> {
    let stored = state.app.ai().add_trading_insight(insight).or_api("Failed to save insight")?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn assistants() -> Json<&'static [Persona]> {
    Json(PERSONAS)
}
