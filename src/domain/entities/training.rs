use crate::domain::values::difficulty::Difficulty;
use crate::domain::values::market_condition::MarketCondition;
use crate::domain::values::order_type::OrderType;
use crate::domain::values::trade_side::TradeSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingScenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Minutes.
    pub duration: u32,
    pub objectives: Vec<String>,
    pub initial_balance: f64,
    pub market_condition: MarketCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedTrade {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub quantity: u32,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    /// Realized profit, set on sells only.
    pub pnl: Option<f64>,
}

/// One user's practice run through a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub user_id: String,
    pub scenario: TrainingScenario,
    /// Cash on hand.
    pub balance: f64,
    pub trades: Vec<SimulatedTrade>,
    pub current_prices: BTreeMap<String, f64>,
    pub is_active: bool,
    pub started_at: DateTime<Utc>,
    /// Oldest first.
    pub feedback: Vec<String>,
    /// Latest coaching message.
    pub guidance: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrder {
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub quantity: u32,
    #[serde(default)]
    pub order_type: OrderType,
    pub limit_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlBreakdown {
    pub realized: f64,
    pub unrealized: f64,
}

impl PnlBreakdown {
    pub fn total(&self) -> f64 {
        self.realized + self.unrealized
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    pub quantity: u32,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Cash plus open positions at current prices.
    pub total_value: f64,
    pub total_pnl: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub return_percentage: f64,
    /// Profitable sells over all trades, 0..=100.
    pub win_rate: f64,
    pub total_trades: usize,
    pub positions: BTreeMap<String, OpenPosition>,
}
