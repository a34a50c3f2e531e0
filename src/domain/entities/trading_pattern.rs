use crate::domain::values::pattern_type::PatternType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPattern {
    pub id: String,
    pub user_id: String,
    pub pattern_type: PatternType,
    pub description: String,
    pub frequency: u32,
    /// Percentage, 0..=100.
    pub success_rate: f64,
    pub avg_return: f64,
    pub conditions: HashMap<String, serde_json::Value>,
    pub examples: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TradingPattern {
    pub fn new(new: NewTradingPattern) -> Self {
        Self {
            id: format!("pattern-{}", uuid::Uuid::new_v4()),
            user_id: new.user_id,
            pattern_type: new.pattern_type,
            description: new.description,
            frequency: new.frequency,
            success_rate: new.success_rate,
            avg_return: new.avg_return,
            conditions: new.conditions,
            examples: new.examples,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: PatternUpdate) {
        if let Some(t) = update.pattern_type {
            self.pattern_type = t;
        }
        if let Some(d) = update.description {
            self.description = d;
        }
        if let Some(f) = update.frequency {
            self.frequency = f;
        }
        if let Some(s) = update.success_rate {
            self.success_rate = s;
        }
        if let Some(r) = update.avg_return {
            self.avg_return = r;
        }
        if let Some(c) = update.conditions {
            self.conditions = c;
        }
        if let Some(e) = update.examples {
            self.examples = e;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTradingPattern {
    #[serde(default)]
    pub user_id: String,
    pub pattern_type: PatternType,
    pub description: String,
    #[serde(default)]
    pub frequency: u32,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub avg_return: f64,
    #[serde(default)]
    pub conditions: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternUpdate {
    pub pattern_type: Option<PatternType>,
    pub description: Option<String>,
    pub frequency: Option<u32>,
    pub success_rate: Option<f64>,
    pub avg_return: Option<f64>,
    pub conditions: Option<HashMap<String, serde_json::Value>>,
    pub examples: Option<Vec<String>>,
}
