use super::error::{ApiError, OrApiError};
use super::identity::Identity;
use super::AppState;
use crate::application::knowledge_base::{MemorySearch, Recommendations, UserAnalytics};
use crate::domain::entities::conversation_memory::{ConversationMemory, NewConversationMemory};
use crate::domain::entities::learning_insight::{InsightUpdate, LearningInsight};
use crate::domain::entities::market_insight::{MarketInsight, NewMarketInsight};
use crate::domain::entities::trading_pattern::{NewTradingPattern, PatternUpdate, TradingPattern};
use crate::domain::entities::user_preference::UserPreference;
use crate::domain::entities::user_profile::{ProfileUpdate, UserProfile};
use crate::domain::values::preference_category::PreferenceCategory;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InsightBody {
    pub concept: String,
    #[serde(flatten)]
    pub update: InsightUpdate,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceBody {
    pub category: PreferenceCategory,
    pub key: String,
    pub value: serde_json::Value,
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>, identity: Identity) -> Result<Json<UserProfile>, ApiError> {
    let user_id = identity.or_demo();
    state
        .app
        .knowledge()
        .get_user_profile(user_id)
        .or_api("Failed to load profile")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No profile for {user_id}")))
}

#[instrument(skip(state))]
pub async fn update_profile(
    State(state): State<AppState>,
    identity: Identity,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .app
        .knowledge()
        .update_user_profile(identity.or_demo(), update)
        .or_api("Failed to update profile")?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn patterns(State(state): State<AppState>, identity: Identity) -> Result<Json<Vec<TradingPattern>>, ApiError> {
    let patterns = state
        .app
        .knowledge()
        .get_trading_patterns(identity.or_demo())
        .or_api("Failed to load trading patterns")?;
    Ok(Json(patterns))
}

#[instrument(skip(state))]
pub async fn add_pattern(
    State(state): State<AppState>,
    identity: Identity,
    Json(mut new): Json<NewTradingPattern>,
) -> Result<(StatusCode, Json<TradingPattern>), ApiError> {
    new.user_id = identity.or_demo().to_string();
    let pattern = state.app.knowledge().add_trading_pattern(new).or_api("Failed to save trading pattern")?;
    Ok((StatusCode::CREATED, Json(pattern)))
}

#[instrument(skip(state))]
pub async fn update_pattern(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(update): Json<PatternUpdate>,
) -> Result<Json<TradingPattern>, ApiError> {
    state
        .app
        .knowledge()
        .update_trading_pattern(identity.or_demo(), &id, update)
        .or_api("Failed to update trading pattern")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Trading pattern {id} not found")))
}

#[instrument(skip(state))]
pub async fn memory(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<MemoryQuery>,
) -> Result<Json<Vec<ConversationMemory>>, ApiError> {
    let memories = state
        .app
        .knowledge()
        .get_conversation_memory(identity.or_demo(), query.session_id.as_deref())
        .or_api("Failed to load conversation memory")?;
    Ok(Json(memories))
}

#[instrument(skip(state))]
pub async fn add_memory(
    State(state): State<AppState>,
    identity: Identity,
    Json(mut new): Json<NewConversationMemory>,
) -> Result<(StatusCode, Json<ConversationMemory>), ApiError> {
    new.user_id = identity.or_demo().to_string();
    let memory = state
        .app
        .knowledge()
        .add_conversation_memory(new)
        .or_api("Failed to save conversation memory")?;
    Ok((StatusCode::CREATED, Json(memory)))
}

#[instrument(skip(state))]
pub async fn insights(State(state): State<AppState>, identity: Identity) -> Result<Json<Vec<LearningInsight>>, ApiError> {
    let insights = state
        .app
        .knowledge()
        .get_learning_insights(identity.or_demo())
        .or_api("Failed to load learning insights")?;
    Ok(Json(insights))
}

#[instrument(skip(state))]
pub async fn update_insight(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<InsightBody>,
) -> Result<Json<LearningInsight>, ApiError> {
    if body.concept.trim().is_empty() {
        return Err(ApiError::bad_request("concept is required"));
    }
    let insight = state
        .app
        .knowledge()
        .update_learning_insight(identity.or_demo(), &body.concept, body.update)
        .or_api("Failed to update learning insight")?;
    Ok(Json(insight))
}

#[instrument(skip(state))]
pub async fn market_insights(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<Vec<MarketInsight>>, ApiError> {
    let symbol = query.symbol.map(|s| s.to_uppercase());
    let insights = state
        .app
        .knowledge()
        .get_market_insights(symbol.as_deref())
        .or_api("Failed to load market insights")?;
    Ok(Json(insights))
}

#[instrument(skip(state))]
pub async fn add_market_insight(
    State(state): State<AppState>,
    Json(new): Json<NewMarketInsight>,
) -> Result<(StatusCode, Json<MarketInsight>), ApiError> {
    let insight = state.app.knowledge().add_market_insight(new).or_api("Failed to save market insight")?;
    Ok((StatusCode::CREATED, Json(insight)))
}

#[instrument(skip(state))]
pub async fn preferences(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<UserPreference>>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<PreferenceCategory>)
        .transpose()
        .map_err(ApiError::bad_request)?;
    let prefs = state
        .app
        .knowledge()
        .get_user_preferences(identity.or_demo(), category)
        .or_api("Failed to load preferences")?;
    Ok(Json(prefs))
}

#[instrument(skip(state))]
pub async fn set_preference(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<PreferenceBody>,
) -> Result<Json<UserPreference>, ApiError> {
    let pref = state
        .app
        .knowledge()
        .set_user_preference(identity.or_demo(), body.category, &body.key, body.value)
        .or_api("Failed to save preference")?;
    Ok(Json(pref))
}

#[instrument(skip(state))]
pub async fn recommendations(State(state): State<AppState>, identity: Identity) -> Result<Json<Recommendations>, ApiError> {
    let recs = state
        .app
        .knowledge()
        .get_personalized_recommendations(identity.or_demo())
        .or_api("Failed to build recommendations")?;
    Ok(Json(recs))
}

#[instrument(skip(state))]
pub async fn analytics(State(state): State<AppState>, identity: Identity) -> Result<Json<UserAnalytics>, ApiError> {
    let analytics = state
        .app
        .knowledge()
        .get_user_analytics(identity.or_demo())
        .or_api("Failed to compute analytics")?;
    Ok(Json(analytics))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<TextQuery>,
) -> Result<Json<MemorySearch>, ApiError> {
    let q = query
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'q' is required"))?;
    let found = state
        .app
        .knowledge()
        .search_memory(identity.or_demo(), q.trim())
        .or_api("Failed to search memory")?;
    Ok(Json(found))
}
