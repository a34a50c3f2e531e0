use crate::application::learning_catalog::{builtin_concepts, builtin_paths};
use crate::domain::entities::learning::{
    LearningConcept, LearningPath, OverallProgress, ProgressUpdate, QuizResult, UserProgress,
};
use crate::domain::error::DomainError;
use crate::domain::values::difficulty::Difficulty;
use crate::domain::values::progress_status::ProgressStatus;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Score at or above which a completed concept counts as mastered.
pub const MASTERY_SCORE: u32 = 80;
const MAX_RECOMMENDATIONS: usize = 3;

type ProgressMap = HashMap<String, HashMap<String, UserProgress>>;

/// Static lesson catalog plus per-user progress.
pub struct LearningSystem {
    concepts: Vec<LearningConcept>,
    paths: Vec<LearningPath>,
    progress: RwLock<ProgressMap>,
}

impl Default for LearningSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningSystem {
    pub fn new() -> Self {
        Self::with_catalog(builtin_concepts(), builtin_paths())
    }

    pub fn with_catalog(concepts: Vec<LearningConcept>, paths: Vec<LearningPath>) -> Self {
        Self {
            concepts,
            paths,
            progress: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ProgressMap>, DomainError> {
        self.progress
            .read()
            .map_err(|e| DomainError::Store(format!("learning progress: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ProgressMap>, DomainError> {
        self.progress
            .write()
            .map_err(|e| DomainError::Store(format!("learning progress: {e}")))
    }

    pub fn get_concept(&self, id: &str) -> Option<&LearningConcept> {
        self.concepts.iter().find(|c| c.id == id)
    }

    pub fn all_concepts(&self) -> &[LearningConcept] {
        &self.concepts
    }

    pub fn concepts_by_difficulty(&self, difficulty: Difficulty) -> Vec<&LearningConcept> {
        self.concepts.iter().filter(|c| c.difficulty == difficulty).collect()
    }

    pub fn get_learning_path(&self, id: &str) -> Option<&LearningPath> {
        self.paths.iter().find(|p| p.id == id)
    }

    pub fn all_learning_paths(&self) -> &[LearningPath] {
        &self.paths
    }

    pub fn get_user_progress(&self, user_id: &str, concept_id: &str) -> Result<Option<UserProgress>, DomainError> {
        Ok(self
            .read()?
            .get(user_id)
            .and_then(|m| m.get(concept_id))
            .cloned())
    }

    pub fn all_user_progress(&self, user_id: &str) -> Result<Vec<UserProgress>, DomainError> {
        let map = self.read()?;
        let mut out: Vec<UserProgress> = map
            .get(user_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        out.sort_by(|a, b| a.concept_id.cmp(&b.concept_id));
        Ok(out)
    }

    /// Merges `update` onto the stored progress (or a not-started record).
    pub fn update_progress(
        &self,
        user_id: &str,
        concept_id: &str,
        update: ProgressUpdate,
    ) -> Result<UserProgress, DomainError> {
        self.require_concept(concept_id)?;
        let mut map = self.write()?;
        let progress = map
            .entry(user_id.to_string())
            .or_default()
            .entry(concept_id.to_string())
            .or_insert_with(|| UserProgress::new(concept_id));
        progress.apply(update);
        Ok(progress.clone())
    }

    pub fn start_concept(&self, user_id: &str, concept_id: &str) -> Result<UserProgress, DomainError> {
        self.update_progress(
            user_id,
            concept_id,
            ProgressUpdate {
                status: Some(ProgressStatus::InProgress),
                ..Default::default()
            },
        )
    }

    pub fn complete_concept(&self, user_id: &str, concept_id: &str, score: u32) -> Result<UserProgress, DomainError> {
        let status = if score >= MASTERY_SCORE {
            ProgressStatus::Mastered
        } else {
            ProgressStatus::Completed
        };
        debug!(user_id, concept_id, score, %status, "concept completed");
        self.update_progress(
            user_id,
            concept_id,
            ProgressUpdate {
                status: Some(status),
                score: Some(score),
                ..Default::default()
            },
        )
    }

    /// Records one answer and returns the running percentage of correct answers.
    pub fn submit_quiz_answer(
        &self,
        user_id: &str,
        concept_id: &str,
        question_id: &str,
        answer: usize,
    ) -> Result<QuizResult, DomainError> {
        let quiz = self
            .get_concept(concept_id)
            .and_then(|c| c.quiz.as_ref())
            .ok_or_else(|| DomainError::NotFound("Concept or quiz not found".to_string()))?;
        let question = quiz
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| DomainError::NotFound("Question not found".to_string()))?;

        let correct = answer == question.correct_answer;

        let mut map = self.write()?;
        let progress = map
            .entry(user_id.to_string())
            .or_default()
            .entry(concept_id.to_string())
            .or_insert_with(|| UserProgress::new(concept_id));
        let status = match progress.status {
            ProgressStatus::NotStarted => ProgressStatus::InProgress,
            s => s,
        };
        let update = ProgressUpdate {
            status: Some(status),
            attempts: Some(progress.attempts + 1),
            correct_answers: Some(progress.correct_answers + u32::from(correct)),
            total_questions: Some(progress.total_questions + 1),
            ..Default::default()
        };
        progress.apply(update);

        let score = progress.correct_answers as f64 / progress.total_questions as f64 * 100.0;

        Ok(QuizResult {
            correct,
            explanation: question.explanation.clone(),
            score: score.round() as u32,
        })
    }

    /// Concepts whose prerequisites are all finished and which are not yet
    /// mastered, in catalog order.
    pub fn recommended_concepts(&self, user_id: &str) -> Result<Vec<LearningConcept>, DomainError> {
        let map = self.read()?;
        let empty = HashMap::new();
        let progress = map.get(user_id).unwrap_or(&empty);

        Ok(self
            .concepts
            .iter()
            .filter(|c| {
                let prerequisites_met = c
                    .prerequisites
                    .iter()
                    .all(|p| progress.get(p).map_or(false, |pr| pr.status.is_finished()));
                let not_mastered = progress
                    .get(&c.id)
                    .map_or(true, |pr| pr.status != ProgressStatus::Mastered);
                prerequisites_met && not_mastered
            })
            .take(MAX_RECOMMENDATIONS)
            .cloned()
            .collect())
    }

    pub fn overall_progress(&self, user_id: &str) -> Result<OverallProgress, DomainError> {
        let map = self.read()?;
        let all: Vec<&UserProgress> = map.get(user_id).map(|m| m.values().collect()).unwrap_or_default();

        let average_score = if all.is_empty() {
            0.0
        } else {
            all.iter().map(|p| p.score as f64).sum::<f64>() / all.len() as f64
        };

        Ok(OverallProgress {
            total_concepts: self.concepts.len(),
            completed_concepts: all.iter().filter(|p| p.status.is_finished()).count(),
            mastered_concepts: all.iter().filter(|p| p.status == ProgressStatus::Mastered).count(),
            average_score: average_score.round() as u32,
            total_time_spent: all.iter().map(|p| p.time_spent).sum(),
        })
    }

    fn require_concept(&self, concept_id: &str) -> Result<(), DomainError> {
        if self.get_concept(concept_id).is_none() {
            return Err(DomainError::NotFound(format!("Concept {concept_id}")));
        }
        Ok(())
    }
}
