use crate::domain::values::risk_tolerance::RiskTolerance;
use crate::domain::values::trading_experience::TradingExperience;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trading profile kept in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub trading_experience: TradingExperience,
    pub risk_tolerance: RiskTolerance,
    pub preferred_assets: Vec<String>,
    pub trading_goals: Vec<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh profile with the most cautious settings.
    pub fn new(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: None,
            email: None,
            trading_experience: TradingExperience::Beginner,
            risk_tolerance: RiskTolerance::Conservative,
            preferred_assets: vec![],
            trading_goals: vec![],
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(exp) = update.trading_experience {
            self.trading_experience = exp;
        }
        if let Some(risk) = update.risk_tolerance {
            self.risk_tolerance = risk;
        }
        if let Some(assets) = update.preferred_assets {
            self.preferred_assets = assets;
        }
        if let Some(goals) = update.trading_goals {
            self.trading_goals = goals;
        }
        if let Some(tz) = update.timezone {
            self.timezone = tz;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub trading_experience: Option<TradingExperience>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub preferred_assets: Option<Vec<String>>,
    pub trading_goals: Option<Vec<String>>,
    pub timezone: Option<String>,
}
