use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub avg_price: f64,
    pub current_price: f64,
    pub pnl: f64,
}

/// The user's mock trading workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxData {
    pub portfolio_value: f64,
    pub positions: Vec<Position>,
    pub watchlist: Vec<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPreferences {
    pub theme: String,
    pub notifications: bool,
    pub risk_level: String,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            notifications: true,
            risk_level: "moderate".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedData {
    pub sandbox_data: SandboxData,
    pub user_preferences: DisplayPreferences,
    pub last_updated: DateTime<Utc>,
}

impl Default for SharedData {
    fn default() -> Self {
        Self {
            sandbox_data: SandboxData {
                portfolio_value: 100_000.0,
                positions: vec![],
                watchlist: vec![],
                notes: vec![],
            },
            user_preferences: DisplayPreferences::default(),
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedDataUpdate {
    pub sandbox_data: Option<SandboxData>,
    pub user_preferences: Option<DisplayPreferences>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SandboxUpdate {
    pub portfolio_value: Option<f64>,
    pub positions: Option<Vec<Position>>,
    pub watchlist: Option<Vec<String>>,
    pub notes: Option<Vec<String>>,
}

impl SharedDataUpdate {
    pub fn is_empty(&self) -> bool {
        self.sandbox_data.is_none() && self.user_preferences.is_none()
    }
}

impl SandboxUpdate {
    pub fn is_empty(&self) -> bool {
        self.portfolio_value.is_none() && self.positions.is_none() && self.watchlist.is_none() && self.notes.is_none()
    }
}

impl SandboxData {
    pub fn apply(&mut self, update: SandboxUpdate) {
        if let Some(v) = update.portfolio_value {
            self.portfolio_value = v;
        }
        if let Some(p) = update.positions {
            self.positions = p;
        }
        if let Some(w) = update.watchlist {
            self.watchlist = w;
        }
        if let Some(n) = update.notes {
            self.notes = n;
        }
    }
}
