use crate::domain::values::difficulty::Difficulty;
use crate::domain::values::progress_status::ProgressStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningConcept {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub prerequisites: Vec<String>,
    /// Minutes.
    pub estimated_time: u32,
    pub key_points: Vec<String>,
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizQuestion>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: String,
    pub name: String,
    pub description: String,
    pub concepts: Vec<String>,
    pub difficulty: Difficulty,
    /// Minutes.
    pub estimated_duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub concept_id: String,
    pub status: ProgressStatus,
    pub score: u32,
    pub time_spent: u32,
    pub last_accessed: DateTime<Utc>,
    pub attempts: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
}

impl UserProgress {
    pub fn new(concept_id: &str) -> Self {
        Self {
            concept_id: concept_id.to_string(),
            status: ProgressStatus::NotStarted,
            score: 0,
            time_spent: 0,
            last_accessed: Utc::now(),
            attempts: 0,
            correct_answers: 0,
            total_questions: 0,
        }
    }

    pub fn apply(&mut self, update: ProgressUpdate) {
        if let Some(s) = update.status {
            self.status = s;
        }
        if let Some(s) = update.score {
            self.score = s;
        }
        if let Some(t) = update.time_spent {
            self.time_spent = t;
        }
        if let Some(a) = update.attempts {
            self.attempts = a;
        }
        if let Some(c) = update.correct_answers {
            self.correct_answers = c;
        }
        if let Some(t) = update.total_questions {
            self.total_questions = t;
        }
        self.last_accessed = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressUpdate {
    pub status: Option<ProgressStatus>,
    pub score: Option<u32>,
    pub time_spent: Option<u32>,
    pub attempts: Option<u32>,
    pub correct_answers: Option<u32>,
    pub total_questions: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub correct: bool,
    pub explanation: String,
    pub score: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
    pub total_concepts: usize,
    pub completed_concepts: usize,
    pub mastered_concepts: usize,
    pub average_score: u32,
    pub total_time_spent: u32,
}
