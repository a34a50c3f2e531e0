use crate::domain::values::understanding::Understanding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How well a user grasps one concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningInsight {
    pub id: String,
    pub user_id: String,
    pub concept: String,
    pub understanding: Understanding,
    pub struggling_areas: Vec<String>,
    pub strengths: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub last_assessed: DateTime<Utc>,
}

impl LearningInsight {
    pub fn new(user_id: &str, concept: &str) -> Self {
        Self {
            id: format!("insight-{}", uuid::Uuid::new_v4()),
            user_id: user_id.to_string(),
            concept: concept.to_string(),
            understanding: Understanding::Basic,
            struggling_areas: vec![],
            strengths: vec![],
            recommended_actions: vec![],
            last_assessed: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: InsightUpdate) {
        if let Some(u) = update.understanding {
            self.understanding = u;
        }
        if let Some(s) = update.struggling_areas {
            self.struggling_areas = s;
        }
        if let Some(s) = update.strengths {
            self.strengths = s;
        }
        if let Some(r) = update.recommended_actions {
            self.recommended_actions = r;
        }
        self.last_assessed = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightUpdate {
    pub understanding: Option<Understanding>,
    pub struggling_areas: Option<Vec<String>>,
    pub strengths: Option<Vec<String>>,
    pub recommended_actions: Option<Vec<String>>,
}
