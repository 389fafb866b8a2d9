//! Procurement source: how an asset was acquired.
//!
//! Encoded as a single digit in the third segment of an asset code.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ProcurementSource {
    #[default]
    Purchase,
    Aid,
    Grant,
    Donation,
    SelfProduced,
}

impl ProcurementSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Aid => "aid",
            Self::Grant => "grant",
            Self::Donation => "donation",
            Self::SelfProduced => "self_produced",
        }
    }

    /// Digit used in the asset code.
    pub fn code_digit(&self) -> u8 {
        match self {
            Self::Purchase => 1,
            Self::Aid => 2,
            Self::Grant => 3,
            Self::Donation => 4,
            Self::SelfProduced => 5,
        }
    }

    /// Parse a caller-supplied source. Unrecognized or empty input is a purchase.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "aid" | "bantuan" => Self::Aid,
            "grant" | "hibah" => Self::Grant,
            "donation" | "sumbangan" => Self::Donation,
            "self_produced" | "self-produced" | "produksi_sendiri" => Self::SelfProduced,
            _ => Self::Purchase,
        }
    }
}

impl From<String> for ProcurementSource {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for ProcurementSource {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl std::fmt::Display for ProcurementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
