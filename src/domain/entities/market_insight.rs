use crate::domain::values::insight::{Impact, InsightType, Timeframe};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsight {
    pub id: String,
    pub symbol: String,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    /// Percentage, 0..=100.
    pub confidence: f64,
    pub impact: Impact,
    pub timeframe: Timeframe,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl MarketInsight {
    pub fn new(new: NewMarketInsight) -> Self {
        Self {
            id: format!("insight-{}", uuid::Uuid::new_v4()),
            symbol: new.symbol,
            insight_type: new.insight_type,
            title: new.title,
            description: new.description,
            confidence: new.confidence,
            impact: new.impact,
            timeframe: new.timeframe,
            tags: new.tags,
            created_at: Utc::now(),
            valid_until: new.valid_until,
        }
    }

    pub fn mentions(&self, lower_query: &str) -> bool {
        self.title.to_lowercase().contains(lower_query)
            || self.description.to_lowercase().contains(lower_query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(lower_query))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarketInsight {
    #[serde(default)]
    pub symbol: String,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub impact: Impact,
    pub timeframe: Timeframe,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}
