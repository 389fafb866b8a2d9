//! Asset condition status.
//!
//! The set of statuses is closed. Older clients still send deprecated values
//! (the legacy Indonesian names and an earlier availability-style
//! vocabulary); those normalize onto the three current statuses instead of
//! being rejected.

use serde::{Deserialize, Serialize};

/// Physical condition of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum AssetStatus {
    #[default]
    Good,
    Damaged,
    Inadequate,
}

impl AssetStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Damaged => "damaged",
            Self::Inadequate => "inadequate",
        }
    }

    /// Map any status string onto the closed set. Never fails.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "good" | "baik" | "available" => Self::Good,
            "damaged" | "rusak" | "disposed" => Self::Damaged,
            "inadequate" | "tidak_memadai" | "in_use" | "maintenance" => Self::Inadequate,
            _ => Self::Good,
        }
    }
}

impl From<String> for AssetStatus {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<&str> for AssetStatus {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
