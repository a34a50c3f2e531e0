use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCondition {
    Bullish,
    Bearish,
    Volatile,
    Sideways,
}

impl MarketCondition {
    /// Span of one random price step, as a fraction of price.
    pub fn volatility(self) -> f64 {
        match self {
            MarketCondition::Volatile => 0.02,
            _ => 0.01,
        }
    }

    /// Drift added to every price step.
    pub fn trend(self) -> f64 {
        match self {
            MarketCondition::Bullish => 0.001,
            MarketCondition::Bearish => -0.001,
            _ => 0.0,
        }
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketCondition::Bullish => write!(f, "bullish"),
            MarketCondition::Bearish => write!(f, "bearish"),
            MarketCondition::Volatile => write!(f, "volatile"),
            MarketCondition::Sideways => write!(f, "sideways"),
        }
    }
}

impl FromStr for MarketCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bullish" => Ok(MarketCondition::Bullish),
            "bearish" => Ok(MarketCondition::Bearish),
            "volatile" => Ok(MarketCondition::Volatile),
            "sideways" => Ok(MarketCondition::Sideways),
            _ => Err(format!("Unknown market condition: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_follows_condition() {
        assert!(MarketCondition::Bullish.trend() > 0.0);
        assert!(MarketCondition::Bearish.trend() < 0.0);
        assert_eq!(MarketCondition::Sideways.trend(), 0.0);
        assert_eq!(MarketCondition::Volatile.volatility(), 2.0 * MarketCondition::Bearish.volatility());
    }
}
