use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const AI_MESSAGE: &str = "ai_message";

/// Row of the `client_activity_logs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub activity_type: String,
    pub activity_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new(user_id: &str, activity_type: &str, activity_data: Option<serde_json::Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            activity_type: activity_type.to_string(),
            activity_data,
            created_at: Utc::now(),
        }
    }
}
