use super::error::{ApiError, OrApiError};
use super::identity::Identity;
use super::AppState;
use crate::domain::entities::account::AccountProfile;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBody {
    pub display_name: Option<String>,
    pub custom_ai_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantBody {
    pub assistant: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingBody {
    pub assistant: Option<String>,
    pub custom_ai_name: Option<String>,
}

#[instrument(skip(state))]
pub async fn get(State(state): State<AppState>, identity: Identity) -> Result<Json<AccountProfile>, ApiError> {
    let profile = state.app.accounts().get_profile(identity.required()?).or_api("Failed to load profile")?;
    Ok(Json(profile))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<AccountProfile>), ApiError> {
    let profile = state
        .app
        .accounts()
        .create_profile(identity.required()?, &body.email, body.display_name)
        .or_api("Failed to create profile")?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<UpdateBody>,
) -> Result<Json<AccountProfile>, ApiError> {
    let profile = state
        .app
        .accounts()
        .update_profile(identity.required()?, body.display_name, body.custom_ai_name)
        .or_api("Failed to update profile")?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn select_assistant(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<AssistantBody>,
) -> Result<Json<AccountProfile>, ApiError> {
    let profile = state
        .app
        .accounts()
        .select_assistant(identity.required()?, &body.assistant)
        .or_api("Failed to select assistant")?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn onboarding(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<OnboardingBody>,
) -> Result<Json<AccountProfile>, ApiError> {
    let profile = state
        .app
        .accounts()
        .complete_onboarding(identity.required()?, body.assistant.as_deref(), body.custom_ai_name)
        .or_api("Failed to complete onboarding")?;
    Ok(Json(profile))
}
