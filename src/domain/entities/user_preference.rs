use crate::domain::values::preference_category::PreferenceCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub id: String,
    pub user_id: String,
    pub category: PreferenceCategory,
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl UserPreference {
    pub fn new(user_id: &str, category: PreferenceCategory, key: &str, value: serde_json::Value) -> Self {
        Self {
            id: format!("pref-{}", uuid::Uuid::new_v4()),
            user_id: user_id.to_string(),
            category,
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        }
    }
}
