use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Chat,
    Learning,
    Trading,
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatMode::Chat => write!(f, "chat"),
            ChatMode::Learning => write!(f, "learning"),
            ChatMode::Trading => write!(f, "trading"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(ChatMode::Chat),
            "learning" => Ok(ChatMode::Learning),
            "trading" => Ok(ChatMode::Trading),
            _ => Err(format!("Unknown chat mode: {s}")),
        }
    }
}
