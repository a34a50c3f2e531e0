use super::error::{ApiError, OrApiError};
use super::identity::Identity;
use super::AppState;
use crate::application::admin::{AnalyticsReport, DashboardStats};
use crate::domain::entities::account::{AccountProfile, AssistantConfig, AssistantConfigInput};
use crate::domain::entities::admin::AdminUser;
use crate::domain::values::analytics_range::AnalyticsRange;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
pub struct UserSearch {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

fn admin(state: &AppState, identity: &Identity) -> Result<AdminUser, ApiError> {
    state
        .app
        .admin()
        .require_admin(identity.required()?)
        .or_api("Failed to verify admin access")
}

#[instrument(skip(state))]
pub async fn setup(State(state): State<AppState>, identity: Identity) -> Result<(StatusCode, Json<AdminUser>), ApiError> {
    let admin = state
        .app
        .admin()
        .setup_first_admin(identity.required()?)
        .or_api("Failed to set up admin")?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// The caller's admin record and permissions.
#[instrument(skip(state))]
pub async fn me(State(state): State<AppState>, identity: Identity) -> Result<Json<AdminUser>, ApiError> {
    state
        .app
        .admin()
        .get_admin_user(identity.required()?)
        .or_api("Failed to verify admin access")?
        .map(Json)
        .ok_or_else(|| ApiError::forbidden("Admin access required"))
}

#[instrument(skip(state))]
pub async fn users(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<UserSearch>,
) -> Result<Json<Vec<AccountProfile>>, ApiError> {
    let admin = admin(&state, &identity)?;
    let users = state
        .app
        .admin()
        .list_users(&admin, query.search.as_deref())
        .or_api("Failed to fetch users")?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn configs(State(state): State<AppState>, identity: Identity) -> Result<Json<Vec<AssistantConfig>>, ApiError> {
    let admin = admin(&state, &identity)?;
    let configs = state.app.admin().list_configs(&admin).or_api("Failed to fetch AI configs")?;
    Ok(Json(configs))
}

#[instrument(skip(state))]
pub async fn create_config(
    State(state): State<AppState>,
    identity: Identity,
    Json(input): Json<AssistantConfigInput>,
) -> Result<(StatusCode, Json<AssistantConfig>), ApiError> {
    let admin = admin(&state, &identity)?;
    let config = state
        .app
        .admin()
        .create_config(&admin, input)
        .or_api("Failed to create AI config")?;
    Ok((StatusCode::CREATED, Json(config)))
}

#[instrument(skip(state))]
pub async fn update_config(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(input): Json<AssistantConfigInput>,
) -> Result<Json<AssistantConfig>, ApiError> {
    let admin = admin(&state, &identity)?;
    let config = state
        .app
        .admin()
        .update_config(&admin, &id, input)
        .or_api("Failed to update AI config")?;
    Ok(Json(config))
}

#[instrument(skip(state))]
pub async fn delete_config(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let admin = admin(&state, &identity)?;
    state.app.admin().delete_config(&admin, &id).or_api("Failed to delete AI config")?;
    info!(config_id = %id, admin = %admin.user_id, "assistant config deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn analytics(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<RangeQuery>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let admin = admin(&state, &identity)?;
    let range = match query.range.as_deref() {
        Some(r) => r.parse::<AnalyticsRange>().map_err(ApiError::bad_request)?,
        None => AnalyticsRange::default(),
    };
    let report = state
        .app
        .admin()
        .analytics(&admin, range)
        .or_api("Failed to fetch analytics")?;
    Ok(Json(report))
}

#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>, identity: Identity) -> Result<Json<DashboardStats>, ApiError> {
    let admin = admin(&state, &identity)?;
    let stats = state.app.admin().dashboard(&admin).or_api("Failed to fetch dashboard stats")?;
    Ok(Json(stats))
}
