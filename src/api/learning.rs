use super::error::{ApiError, OrApiError};
use super::identity::Identity;
use super::AppState;
use crate::domain::entities::learning::{LearningConcept, LearningPath, OverallProgress, QuizResult, UserProgress};
use crate::domain::values::difficulty::Difficulty;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ConceptQuery {
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
    pub score: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBody {
    pub question_id: String,
    pub answer: usize,
}

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub overall: OverallProgress,
    pub concepts: Vec<UserProgress>,
}

#[instrument(skip(state))]
pub async fn concepts(
    State(state): State<AppState>,
    Query(query): Query<ConceptQuery>,
) -> Result<Json<Vec<LearningConcept>>, ApiError> {
    let learning = state.app.learning();
    let concepts = match query.difficulty.as_deref() {
        Some(d) => {
            let difficulty = d.parse::<Difficulty>().map_err(ApiError::bad_request)?;
            learning.concepts_by_difficulty(difficulty).into_iter().cloned().collect()
        }
        None => learning.all_concepts().to_vec(),
    };
    Ok(Json(concepts))
}

#[instrument(skip(state))]
pub async fn concept(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<LearningConcept>, ApiError> {
    state
        .app
        .learning()
        .get_concept(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Concept {id} not found")))
}

#[instrument(skip(state))]
pub async fn paths(State(state): State<AppState>) -> Json<Vec<LearningPath>> {
    Json(state.app.learning().all_learning_paths().to_vec())
}

#[instrument(skip(state))]
pub async fn path(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<LearningPath>, ApiError> {
    state
        .app
        .learning()
        .get_learning_path(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Learning path {id} not found")))
}

#[instrument(skip(state))]
pub async fn start(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<UserProgress>, ApiError> {
    let progress = state
        .app
        .learning()
        .start_concept(identity.or_demo(), &id)
        .or_api("Failed to start concept")?;
    Ok(Json(progress))
}

#[instrument(skip(state))]
pub async fn complete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<CompleteBody>,
) -> Result<Json<UserProgress>, ApiError> {
    if body.score > 100 {
        return Err(ApiError::bad_request("score must be between 0 and 100"));
    }
    let progress = state
        .app
        .learning()
        .complete_concept(identity.or_demo(), &id, body.score)
        .or_api("Failed to complete concept")?;
    Ok(Json(progress))
}

#[instrument(skip(state))]
pub async fn quiz(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(body): Json<QuizBody>,
) -> Result<Json<QuizResult>, ApiError> {
    let result = state
        .app
        .learning()
        .submit_quiz_answer(identity.or_demo(), &id, &body.question_id, body.answer)
        .or_api("Failed to submit answer")?;
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<LearningConcept>>, ApiError> {
    let concepts = state
        .app
        .learning()
        .recommended_concepts(identity.or_demo())
        .or_api("Failed to build recommendations")?;
    Ok(Json(concepts))
}

#[instrument(skip(state))]
pub async fn progress(State(state): State<AppState>, identity: Identity) -> Result<Json<ProgressReport>, ApiError> {
    let learning = state.app.learning();
    let user_id = identity.or_demo();
    let overall = learning.overall_progress(user_id).or_api("Failed to load progress")?;
    let concepts = learning.all_user_progress(user_id).or_api("Failed to load progress")?;
    Ok(Json(ProgressReport { overall, concepts }))
}
