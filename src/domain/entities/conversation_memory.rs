use crate::domain::values::sentiment::Sentiment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMemory {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub topic: String,
    pub context: HashMap<String, serde_json::Value>,
    pub key_points: Vec<String>,
    pub sentiment: Sentiment,
    pub timestamp: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ConversationMemory {
    pub fn new(new: NewConversationMemory) -> Self {
        Self {
            id: format!("memory-{}", uuid::Uuid::new_v4()),
            user_id: new.user_id,
            session_id: new.session_id,
            topic: new.topic,
            context: new.context,
            key_points: new.key_points,
            sentiment: new.sentiment,
            timestamp: Utc::now(),
            expires_at: new.expires_at,
        }
    }

    pub fn mentions(&self, lower_query: &str) -> bool {
        self.topic.to_lowercase().contains(lower_query)
            || self
                .key_points
                .iter()
                .any(|p| p.to_lowercase().contains(lower_query))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversationMemory {
    #[serde(default)]
    pub user_id: String,
    pub session_id: String,
    pub topic: String,
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
