//! Row model for the `assets` table.
//!
//! Enum columns are stored as their snake_case names; legacy values read
//! back from older rows are normalized by the core enums.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use inventory_core::asset::{Asset, AssetFields, BulkMembership};
use inventory_core::procurement::ProcurementSource;
use inventory_core::status::AssetStatus;
use inventory_core::types::{AssetId, BulkId, CategoryId, DbId, Timestamp};

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetRow {
    pub id: AssetId,
    pub code: String,
    pub name: String,
    pub specification: Option<String>,
    pub quantity: i32,
    pub unit: String,
    pub acquisition_date: NaiveDate,
    pub acquisition_price: f64,
    pub useful_life_years: i32,
    pub useful_life_months: i32,
    pub accumulated_depreciation: f64,
    pub residual_value: f64,
    pub description: Option<String>,
    pub location_id: Option<DbId>,
    pub category_id: CategoryId,
    pub procurement_source: String,
    pub status: String,
    pub bulk_id: Option<BulkId>,
    pub bulk_sequence: Option<i32>,
    pub is_bulk_parent: bool,
    pub bulk_total_count: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        let bulk = match (row.bulk_id, row.bulk_sequence, row.bulk_total_count) {
            (Some(bulk_id), Some(bulk_sequence), Some(bulk_total_count)) => Some(BulkMembership {
                bulk_id,
                bulk_sequence,
                is_bulk_parent: row.is_bulk_parent,
                bulk_total_count,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            code: row.code,
            fields: AssetFields {
                name: row.name,
                specification: row.specification,
                quantity: row.quantity,
                unit: row.unit,
                acquisition_date: row.acquisition_date,
                acquisition_price: row.acquisition_price,
                useful_life_years: row.useful_life_years,
                description: row.description,
                location_id: row.location_id,
                category_id: row.category_id,
                procurement_source: ProcurementSource::parse(&row.procurement_source),
                status: AssetStatus::normalize(&row.status),
            },
            useful_life_months: row.useful_life_months,
            accumulated_depreciation: row.accumulated_depreciation,
            residual_value: row.residual_value,
            bulk,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row() -> AssetRow {
        let now = Utc::now();
        AssetRow {
            id: Uuid::new_v4(),
            code: "001.10.1.24.001".into(),
            name: "Projector".into(),
            specification: None,
            quantity: 1,
            unit: "unit".into(),
            acquisition_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            acquisition_price: 9_000_000.0,
            useful_life_years: 4,
            useful_life_months: 48,
            accumulated_depreciation: 0.0,
            residual_value: 9_000_000.0,
            description: None,
            location_id: None,
            category_id: Uuid::new_v4(),
            procurement_source: "hibah".into(),
            status: "maintenance".into(),
            bulk_id: None,
            bulk_sequence: None,
            is_bulk_parent: false,
            bulk_total_count: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn legacy_enum_values_are_normalized() {
        let asset = Asset::from(row());
        assert_eq!(asset.fields.procurement_source, ProcurementSource::Grant);
        assert_eq!(asset.fields.status, AssetStatus::Inadequate);
        assert!(asset.bulk.is_none());
    }

    #[test]
    fn bulk_columns_become_membership() {
        let bulk_id = Uuid::new_v4();
        let mut r = row();
        r.bulk_id = Some(bulk_id);
        r.bulk_sequence = Some(1);
        r.is_bulk_parent = true;
        r.bulk_total_count = Some(4);

        let asset = Asset::from(r);
        assert_eq!(
            asset.bulk,
            Some(BulkMembership {
                bulk_id,
                bulk_sequence: 1,
                is_bulk_parent: true,
                bulk_total_count: 4,
            })
        );
    }
}
