use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback window for synthetic daily bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl HistoryPeriod {
    pub fn days(&self) -> i64 {
        match self {
            Self::OneDay => 1,
            Self::FiveDays => 5,
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::OneYear => 365,
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneDay => write!(f, "1d"),
            Self::FiveDays => write!(f, "5d"),
            Self::OneMonth => write!(f, "1m"),
            Self::ThreeMonths => write!(f, "3m"),
            Self::OneYear => write!(f, "1y"),
        }
    }
}

impl FromStr for HistoryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(Self::OneDay),
            "5d" => Ok(Self::FiveDays),
            "1m" => Ok(Self::OneMonth),
            "3m" => Ok(Self::ThreeMonths),
            "1y" => Ok(Self::OneYear),
            _ => Err(format!("Unknown period: {s}. Use 1d, 5d, 1m, 3m or 1y")),
        }
    }
}
