use super::error::{ApiError, OrApiError};
use super::identity::Identity;
use super::AppState;
use crate::domain::entities::shared_data::{SandboxUpdate, SharedData, SharedDataUpdate};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

/// Accepts `sandboxData`/`userPreferences` replacements and individual
/// sandbox fields in the same body.
#[derive(Debug, Default, Deserialize)]
pub struct SandboxPatch {
    #[serde(flatten)]
    pub workspace: SharedDataUpdate,
    #[serde(flatten)]
    pub sandbox: SandboxUpdate,
}

#[instrument(skip(state))]
pub async fn get(State(state): State<AppState>, identity: Identity) -> Result<Json<SharedData>, ApiError> {
    let user_id = identity.or_demo();
    state
        .app
        .sandbox()
        .get_user_data(user_id)
        .or_api("Failed to load sandbox")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No sandbox for {user_id}")))
}

#[instrument(skip(state))]
pub async fn patch(
    State(state): State<AppState>,
    identity: Identity,
    Json(patch): Json<SandboxPatch>,
) -> Result<Json<SharedData>, ApiError> {
    let SandboxPatch { workspace, sandbox } = patch;
    if workspace.is_empty() && sandbox.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    let data = state
        .app
        .sandbox()
        .apply_patch(identity.or_demo(), workspace, sandbox)
        .or_api("Failed to update sandbox")?;
    Ok(Json(data))
}

#[instrument(skip(state))]
pub async fn sync(State(state): State<AppState>, identity: Identity) -> Result<Json<SharedData>, ApiError> {
    let user_id = identity.or_demo();
    state
        .app
        .sync_sandbox(user_id)
        .or_api("Failed to sync sandbox")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No knowledge profile for {user_id}")))
}
