use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Understanding {
    Poor,
    #[default]
    Basic,
    Good,
    Excellent,
}

impl Understanding {
    /// Ordinal score on a 1..=4 scale.
    pub fn score(&self) -> u32 {
        match self {
            Self::Poor => 1,
            Self::Basic => 2,
            Self::Good => 3,
            Self::Excellent => 4,
        }
    }

    pub fn needs_work(&self) -> bool {
        matches!(self, Self::Poor | Self::Basic)
    }
}
