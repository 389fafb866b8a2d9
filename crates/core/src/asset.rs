//! Asset domain types.
//!
//! `AssetFields` is the set of business values a caller supplies; everything
//! else on `Asset` (identity, code, depreciation, bulk membership,
//! timestamps) is assigned by the lifecycle engine.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::depreciation::Depreciation;
use crate::procurement::ProcurementSource;
use crate::status::AssetStatus;
use crate::types::{AssetId, BulkId, CategoryId, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Caller-supplied fields
// ---------------------------------------------------------------------------

/// Business fields of an asset, as supplied by the caller on create/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AssetFields {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub specification: Option<String>,
    /// Loosely tracked count for non-bulk assets. Forced to 1 on bulk members.
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Unit of measure (`unit`, `pcs`, `meter`, ...).
    #[validate(length(min = 1, max = 50))]
    pub unit: String,
    pub acquisition_date: NaiveDate,
    /// Upper bound keeps non-finite prices out of depreciation.
    #[validate(range(exclusive_min = 0.0, max = 1.0e15))]
    pub acquisition_price: f64,
    #[validate(range(min = 1))]
    pub useful_life_years: i32,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub procurement_source: ProcurementSource,
    #[serde(default)]
    pub status: AssetStatus,
}

impl AssetFields {
    pub fn acquisition_year(&self) -> i32 {
        self.acquisition_date.year()
    }
}

// ---------------------------------------------------------------------------
// Bulk membership
// ---------------------------------------------------------------------------

/// Position of an asset inside a bulk group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkMembership {
    pub bulk_id: BulkId,
    /// 1-based position within the group.
    pub bulk_sequence: i32,
    pub is_bulk_parent: bool,
    /// Group size, copied onto every member.
    pub bulk_total_count: i32,
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// One physical unit, or one member of a bulk group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub code: String,
    #[serde(flatten)]
    pub fields: AssetFields,
    pub useful_life_months: i32,
    pub accumulated_depreciation: f64,
    pub residual_value: f64,
    pub bulk: Option<BulkMembership>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Asset {
    pub fn bulk_id(&self) -> Option<BulkId> {
        self.bulk.map(|b| b.bulk_id)
    }

    pub fn is_bulk_parent(&self) -> bool {
        self.bulk.is_some_and(|b| b.is_bulk_parent)
    }

    /// Overwrite the derived depreciation columns.
    pub fn apply_depreciation(&mut self, dep: Depreciation) {
        self.useful_life_months = dep.useful_life_months;
        self.accumulated_depreciation = dep.accumulated;
        self.residual_value = dep.residual;
    }

    /// The derived depreciation columns as currently stored.
    pub fn depreciation(&self) -> Depreciation {
        Depreciation {
            useful_life_months: self.useful_life_months,
            accumulated: self.accumulated_depreciation,
            residual: self.residual_value,
        }
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// Asset category. `code` feeds the second segment of asset codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCategory {
    pub id: CategoryId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Physical location. `code` feeds the first segment of asset codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn fields() -> AssetFields {
        AssetFields {
            name: "Office chair".into(),
            specification: Some("Ergonomic, black".into()),
            quantity: 1,
            unit: "unit".into(),
            acquisition_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            acquisition_price: 1_200_000.0,
            useful_life_years: 5,
            description: None,
            location_id: Some(1),
            category_id: uuid::Uuid::nil(),
            procurement_source: ProcurementSource::Purchase,
            status: AssetStatus::Good,
        }
    }
}
