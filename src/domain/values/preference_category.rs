use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceCategory {
    Ui,
    Trading,
    Notifications,
    Learning,
}

impl fmt::Display for PreferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ui => write!(f, "ui"),
            Self::Trading => write!(f, "trading"),
            Self::Notifications => write!(f, "notifications"),
            Self::Learning => write!(f, "learning"),
        }
    }
}

impl FromStr for PreferenceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ui" => Ok(Self::Ui),
            "trading" => Ok(Self::Trading),
            "notifications" => Ok(Self::Notifications),
            "learning" => Ok(Self::Learning),
            _ => Err(format!("Unknown preference category: {s}")),
        }
    }
}
